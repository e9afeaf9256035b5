//! Error surface of the tracker views.

use std::io;
use std::path::PathBuf;

use folio_client::{AuthFailure, SyncError};
use folio_events::MarkerError;
use thiserror::Error;

/// Result alias for view operations.
pub type TrackerResult<T> = Result<T, TrackerError>;

/// Failure of a view operation.
///
/// Views also record every failure in their own state (dialog message or
/// notice) before returning it.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Backend call failed or input was rejected locally.
    #[error(transparent)]
    Remote(#[from] SyncError),
    /// Confirmation belongs to another view or target.
    #[error("confirmation does not match this view")]
    ConfirmationMismatch,
    /// Downloaded payload could not be written.
    #[error("failed to write download to {path}: {source}")]
    Download {
        /// Destination being written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Shared state in the state directory could not be written.
    #[error(transparent)]
    State(#[from] MarkerError),
}

impl TrackerError {
    /// Auth failure that requires signing in again.
    #[must_use]
    pub const fn session_failure(&self) -> Option<AuthFailure> {
        match self {
            Self::Remote(SyncError::Auth(failure)) => Some(*failure),
            _ => None,
        }
    }

    /// Remote error, when this failure came from the backend or validation.
    #[must_use]
    pub const fn as_remote(&self) -> Option<&SyncError> {
        match self {
            Self::Remote(err) => Some(err),
            _ => None,
        }
    }
}
