//! Error primitives for markers and shared state files.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Error emitted when a marker or state file cannot be persisted.
#[derive(Debug, Error)]
pub enum MarkerError {
    /// Locking or writing a state file failed.
    #[error("state file {path} is not writable: {source}")]
    Io {
        /// File being written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The new contents could not be serialised.
    #[error("failed to encode state file: {0}")]
    Encode(#[from] serde_json::Error),
}

impl MarkerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result wrapper for marker store operations.
pub type MarkerResult<T> = Result<T, MarkerError>;
