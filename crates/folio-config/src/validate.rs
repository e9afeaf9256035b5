//! Validation of resolved configuration.

use std::time::Duration;

use crate::defaults::MAX_RETRY_ATTEMPTS;
use crate::error::{ConfigError, ConfigResult};
use crate::model::TrackerConfig;

const LOG_FORMATS: [&str; 2] = ["pretty", "json"];

/// Reject configurations the tracker cannot run with.
///
/// # Errors
/// Returns [`ConfigError::InvalidField`] naming the first offending field.
pub fn validate(config: &TrackerConfig) -> ConfigResult<()> {
    if !matches!(config.api_url.scheme(), "http" | "https") {
        return Err(ConfigError::invalid(
            "api_url",
            Some(config.api_url.to_string()),
            "must use http or https",
        ));
    }
    ensure_positive("http_timeout", config.http_timeout)?;
    ensure_positive("poll_interval", config.poll_interval)?;
    if config.retry_attempts > MAX_RETRY_ATTEMPTS {
        return Err(ConfigError::invalid(
            "retry_attempts",
            Some(config.retry_attempts.to_string()),
            format!("must be at most {MAX_RETRY_ATTEMPTS}"),
        ));
    }
    if let Some(user_id) = config.user_id.filter(|id| *id <= 0) {
        return Err(ConfigError::invalid(
            "user_id",
            Some(user_id.to_string()),
            "must be positive",
        ));
    }
    if let Some(format) = config
        .log_format
        .as_deref()
        .filter(|format| !LOG_FORMATS.contains(format))
    {
        return Err(ConfigError::invalid(
            "log_format",
            Some(format.to_string()),
            "must be 'pretty' or 'json'",
        ));
    }
    Ok(())
}

fn ensure_positive(field: &'static str, value: Duration) -> ConfigResult<()> {
    if value.is_zero() {
        return Err(ConfigError::invalid(
            field,
            Some("0".to_string()),
            "must be greater than zero",
        ));
    }
    Ok(())
}
