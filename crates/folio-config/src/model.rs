//! Resolved configuration and its on-disk shape.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use folio_core::UserId;

use crate::defaults::{
    DEFAULT_API_URL, DEFAULT_HTTP_TIMEOUT, DEFAULT_LOG_LEVEL, DEFAULT_POLL_INTERVAL,
    DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_BACKOFF, default_download_dir, default_state_dir,
};
use crate::error::{ConfigError, ConfigResult};

/// Fully resolved tracker configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Backend base URL.
    pub api_url: Url,
    /// Signed-in user.
    pub user_id: Option<UserId>,
    /// Bearer token issued by the auth service.
    pub token: Option<String>,
    /// Per-request timeout.
    pub http_timeout: Duration,
    /// Progress polling interval while a folder is open.
    pub poll_interval: Duration,
    /// Attempts per idempotent call.
    pub retry_attempts: u32,
    /// Base delay between retries.
    pub retry_backoff: Duration,
    /// Directory holding the shared dirty-marker file.
    pub state_dir: PathBuf,
    /// Default destination for downloads.
    pub download_dir: PathBuf,
    /// Default log directive.
    pub log_level: String,
    /// `pretty` or `json`; inferred from the build when unset.
    pub log_format: Option<String>,
}

impl fmt::Debug for TrackerConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("TrackerConfig")
            .field("api_url", &self.api_url.as_str())
            .field("user_id", &self.user_id)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("http_timeout", &self.http_timeout)
            .field("poll_interval", &self.poll_interval)
            .field("retry_attempts", &self.retry_attempts)
            .field("retry_backoff", &self.retry_backoff)
            .field("state_dir", &self.state_dir)
            .field("download_dir", &self.download_dir)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl TrackerConfig {
    /// Built-in defaults.
    ///
    /// # Errors
    /// Never fails in practice; the default URL is a constant.
    pub fn defaults() -> ConfigResult<Self> {
        Ok(Self {
            api_url: parse_url(DEFAULT_API_URL)?,
            user_id: None,
            token: None,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            state_dir: default_state_dir(),
            download_dir: default_download_dir(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_format: None,
        })
    }

    /// Apply every field set in `layer`.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidField`] when `api_url` does not parse.
    pub fn apply(&mut self, layer: &ConfigLayer) -> ConfigResult<()> {
        if let Some(url) = &layer.api_url {
            self.api_url = parse_url(url)?;
        }
        if let Some(user_id) = layer.user_id {
            self.user_id = Some(user_id);
        }
        if let Some(token) = layer.token.as_ref().filter(|token| !token.trim().is_empty()) {
            self.token = Some(token.trim().to_string());
        }
        if let Some(secs) = layer.http_timeout_secs {
            self.http_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = layer.poll_interval_secs {
            self.poll_interval = Duration::from_secs(secs);
        }
        if let Some(attempts) = layer.retry_attempts {
            self.retry_attempts = attempts;
        }
        if let Some(millis) = layer.retry_backoff_ms {
            self.retry_backoff = Duration::from_millis(millis);
        }
        if let Some(dir) = &layer.state_dir {
            self.state_dir.clone_from(dir);
        }
        if let Some(dir) = &layer.download_dir {
            self.download_dir.clone_from(dir);
        }
        if let Some(level) = &layer.log_level {
            self.log_level.clone_from(level);
        }
        if let Some(format) = &layer.log_format {
            self.log_format = Some(format.clone());
        }
        Ok(())
    }
}

fn parse_url(raw: &str) -> ConfigResult<Url> {
    Url::parse(raw.trim())
        .map_err(|err| ConfigError::invalid("api_url", Some(raw.to_string()), err.to_string()))
}

/// One partial configuration source (a TOML file or the environment).
///
/// Every field is optional so partial files work; later layers win.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    /// Backend base URL.
    pub api_url: Option<String>,
    /// Signed-in user.
    pub user_id: Option<UserId>,
    /// Bearer token.
    pub token: Option<String>,
    /// Per-request timeout in seconds.
    pub http_timeout_secs: Option<u64>,
    /// Polling interval in seconds.
    pub poll_interval_secs: Option<u64>,
    /// Attempts per idempotent call.
    pub retry_attempts: Option<u32>,
    /// Base retry delay in milliseconds.
    pub retry_backoff_ms: Option<u64>,
    /// Dirty-marker directory.
    pub state_dir: Option<PathBuf>,
    /// Download directory.
    pub download_dir: Option<PathBuf>,
    /// Default log directive.
    pub log_level: Option<String>,
    /// `pretty` or `json`.
    pub log_format: Option<String>,
}

impl ConfigLayer {
    /// Combine two layers; values in `overlay` take precedence.
    #[must_use]
    pub fn merge(self, overlay: Self) -> Self {
        Self {
            api_url: overlay.api_url.or(self.api_url),
            user_id: overlay.user_id.or(self.user_id),
            token: overlay.token.or(self.token),
            http_timeout_secs: overlay.http_timeout_secs.or(self.http_timeout_secs),
            poll_interval_secs: overlay.poll_interval_secs.or(self.poll_interval_secs),
            retry_attempts: overlay.retry_attempts.or(self.retry_attempts),
            retry_backoff_ms: overlay.retry_backoff_ms.or(self.retry_backoff_ms),
            state_dir: overlay.state_dir.or(self.state_dir),
            download_dir: overlay.download_dir.or(self.download_dir),
            log_level: overlay.log_level.or(self.log_level),
            log_format: overlay.log_format.or(self.log_format),
        }
    }
}
