//! Error types for configuration loading.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration file exists but could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// A configuration file is not valid TOML for the expected shape.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// File being parsed.
        path: PathBuf,
        /// Parser diagnostic.
        #[source]
        source: toml::de::Error,
    },
    /// Field contained an invalid value.
    #[error("invalid value for '{field}': {message}")]
    InvalidField {
        /// Field that failed validation.
        field: &'static str,
        /// Offending value when available.
        value: Option<String>,
        /// Human-readable error description.
        message: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(
        field: &'static str,
        value: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidField {
            field,
            value,
            message: message.into(),
        }
    }
}

/// Result wrapper for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
