//! Layered loading: defaults, then TOML files, then `FOLIO_*` variables.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{ConfigLayer, TrackerConfig};
use crate::validate::validate;

/// Project-local override file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = ".folio.toml";
/// Prefix of every environment override.
pub const ENV_PREFIX: &str = "FOLIO_";

/// Platform config path: `<config_dir>/folio/config.toml`.
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("folio").join("config.toml"))
}

/// Files consulted, lowest precedence first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSources {
    /// TOML files; missing files are skipped.
    pub files: Vec<PathBuf>,
}

impl ConfigSources {
    /// Platform config overlaid by `./.folio.toml`.
    #[must_use]
    pub fn standard() -> Self {
        let mut files: Vec<PathBuf> = config_path().into_iter().collect();
        files.push(PathBuf::from(LOCAL_CONFIG_FILE));
        Self { files }
    }

    /// Exactly one explicit file.
    #[must_use]
    pub fn single(path: impl Into<PathBuf>) -> Self {
        Self {
            files: vec![path.into()],
        }
    }
}

/// Load configuration from the standard files and the process environment.
///
/// # Errors
/// Returns [`ConfigError`] when a file is unreadable or malformed, an
/// environment value does not parse, or the result fails validation.
pub fn load() -> ConfigResult<TrackerConfig> {
    load_with(&ConfigSources::standard(), |key| std::env::var(key).ok())
}

/// Load configuration from explicit sources and an environment lookup.
///
/// # Errors
/// See [`load`].
pub fn load_with<E>(sources: &ConfigSources, env: E) -> ConfigResult<TrackerConfig>
where
    E: Fn(&str) -> Option<String>,
{
    let mut file_layer = ConfigLayer::default();
    for path in &sources.files {
        if let Some(layer) = read_layer(path)? {
            debug!(path = %path.display(), "loaded config file");
            file_layer = file_layer.merge(layer);
        }
    }

    let mut config = TrackerConfig::defaults()?;
    config.apply(&file_layer)?;
    config.apply(&env_layer(env)?)?;
    validate(&config)?;
    Ok(config)
}

/// Parse one TOML file; `Ok(None)` when it does not exist.
///
/// # Errors
/// Returns [`ConfigError::Io`] or [`ConfigError::Parse`].
pub fn read_layer(path: &Path) -> ConfigResult<Option<ConfigLayer>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    toml::from_str(&content)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

fn env_layer<E>(env: E) -> ConfigResult<ConfigLayer>
where
    E: Fn(&str) -> Option<String>,
{
    let var = |name: &str| {
        env(&format!("{ENV_PREFIX}{name}")).filter(|value| !value.trim().is_empty())
    };
    Ok(ConfigLayer {
        api_url: var("API_URL"),
        user_id: parse_env(var("USER_ID"), "user_id")?,
        token: var("TOKEN"),
        http_timeout_secs: parse_env(var("HTTP_TIMEOUT_SECS"), "http_timeout")?,
        poll_interval_secs: parse_env(var("POLL_INTERVAL_SECS"), "poll_interval")?,
        retry_attempts: parse_env(var("RETRY_ATTEMPTS"), "retry_attempts")?,
        retry_backoff_ms: parse_env(var("RETRY_BACKOFF_MS"), "retry_backoff")?,
        state_dir: var("STATE_DIR").map(PathBuf::from),
        download_dir: var("DOWNLOAD_DIR").map(PathBuf::from),
        log_level: var("LOG_LEVEL"),
        log_format: var("LOG_FORMAT"),
    })
}

fn parse_env<T: std::str::FromStr>(
    raw: Option<String>,
    field: &'static str,
) -> ConfigResult<Option<T>> {
    raw.map(|value| {
        value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::invalid(field, Some(value.clone()), "must be a non-negative integer"))
    })
    .transpose()
}
