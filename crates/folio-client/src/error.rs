//! Error taxonomy for backend calls.

use std::fmt::{self, Display, Formatter};

use folio_api_models::ErrorBody;
use reqwest::StatusCode;
use thiserror::Error;

/// Result alias for backend calls.
pub type SyncResult<T> = Result<T, SyncError>;

/// Backend capability being exercised; used for logs and error mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `GET /folders/{userId}`.
    ListFolders,
    /// `POST /folders/create`.
    CreateFolder,
    /// `PATCH /folders/{id}/rename`.
    RenameFolder,
    /// `DELETE /folders/{id}`.
    DeleteFolder,
    /// `GET /folders/{id}/categories`.
    ListCategories,
    /// `POST /folders/{id}/categories`.
    CreateCategory,
    /// `PUT /folders/{id}/categories/{name}`.
    RenameCategory,
    /// `DELETE /folders/{id}/categories/{name}`.
    DeleteCategory,
    /// `GET /folders/{id}/categories/{name}/files`.
    ListCategoryFiles,
    /// `GET /files/{folderId}/unclassified`.
    ListUnclassified,
    /// `GET /folders/{id}/progress`.
    Progress,
    /// `POST /folders/{id}/classify`.
    Classify,
    /// `POST /folders/{id}/classify/failed`.
    RetryFailed,
    /// `DELETE /files/{fileId}`.
    DeleteFile,
    /// `POST /files/unzip/{folderId}/{fileId}`.
    ExpandArchive,
    /// `POST /files/upload/{folderId}`.
    Upload,
    /// `GET /folders/download/...`.
    Download,
    /// `GET /auth/verify`.
    VerifySession,
}

impl Operation {
    /// Machine-friendly label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ListFolders => "list_folders",
            Self::CreateFolder => "create_folder",
            Self::RenameFolder => "rename_folder",
            Self::DeleteFolder => "delete_folder",
            Self::ListCategories => "list_categories",
            Self::CreateCategory => "create_category",
            Self::RenameCategory => "rename_category",
            Self::DeleteCategory => "delete_category",
            Self::ListCategoryFiles => "list_category_files",
            Self::ListUnclassified => "list_unclassified",
            Self::Progress => "progress",
            Self::Classify => "classify",
            Self::RetryFailed => "retry_failed",
            Self::DeleteFile => "delete_file",
            Self::ExpandArchive => "expand_archive",
            Self::Upload => "upload",
            Self::Download => "download",
            Self::VerifySession => "verify_session",
        }
    }

    /// Operations whose `400` response means the name is already taken.
    #[must_use]
    pub const fn is_naming(self) -> bool {
        matches!(
            self,
            Self::CreateFolder | Self::RenameFolder | Self::CreateCategory | Self::RenameCategory
        )
    }
}

impl Display for Operation {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Reason an authenticated call was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthFailure {
    /// No credential was configured.
    MissingCredentials,
    /// The credential does not match the user.
    InvalidKey,
    /// The session idled past the backend's inactivity window.
    Timeout,
    /// The token could not be decoded.
    JwtError,
    /// Any other expiry or verification failure.
    Expired,
}

impl AuthFailure {
    /// Map the backend's `detail.error` code.
    #[must_use]
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("invalid_key") => Self::InvalidKey,
            Some("timeout") => Self::Timeout,
            Some("jwt_error") => Self::JwtError,
            _ => Self::Expired,
        }
    }
}

impl Display for AuthFailure {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::MissingCredentials => "no credentials configured; sign in first",
            Self::InvalidKey => "credentials are not valid; sign in again",
            Self::Timeout => "session expired after 30 minutes of inactivity; sign in again",
            Self::JwtError => "session token is malformed; sign in again",
            Self::Expired => "session expired or is invalid; sign in again",
        })
    }
}

/// Failure of a backend call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    /// Input rejected locally; never sent.
    #[error("{message}")]
    Validation {
        /// Reason shown to the user.
        message: String,
    },
    /// Name already in use; message is the server's own text.
    #[error("{message}")]
    Conflict {
        /// Server-provided message.
        message: String,
    },
    /// Target no longer exists.
    #[error("not found: {message}")]
    NotFound {
        /// Server-provided message.
        message: String,
    },
    /// Request refused for a business reason other than a name conflict.
    #[error("request rejected ({status}): {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Server-provided message.
        message: String,
    },
    /// Credential missing, expired, or invalid.
    #[error("authentication failed: {0}")]
    Auth(AuthFailure),
    /// Backend failed while handling the request.
    #[error("server error ({status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Server-provided message.
        message: String,
    },
    /// Backend unreachable or the connection dropped.
    #[error("request to {operation} failed: {message}")]
    Transport {
        /// Operation that failed.
        operation: Operation,
        /// Transport diagnostic.
        message: String,
    },
    /// Response body did not match the expected shape.
    #[error("failed to decode {operation} response: {message}")]
    Decode {
        /// Operation that failed.
        operation: Operation,
        /// Decoder diagnostic.
        message: String,
    },
}

impl SyncError {
    /// Construct a local validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Construct a transport failure.
    pub fn transport(operation: Operation, message: impl Into<String>) -> Self {
        Self::Transport {
            operation,
            message: message.into(),
        }
    }

    /// Transient failures worth retrying for idempotent calls.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Server { .. })
    }

    /// Whether the consumer must drop its session.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// Whether the target was already gone.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub(crate) fn from_reqwest(operation: Operation, err: &reqwest::Error) -> SyncError {
    if err.is_decode() {
        SyncError::Decode {
            operation,
            message: err.to_string(),
        }
    } else {
        SyncError::transport(operation, err.to_string())
    }
}

/// Classify a non-success status and its body into a [`SyncError`].
#[must_use]
pub fn classify_status(operation: Operation, status: StatusCode, body: &[u8]) -> SyncError {
    let parsed = serde_json::from_slice::<ErrorBody>(body).ok();
    let message = parsed
        .as_ref()
        .and_then(ErrorBody::message)
        .unwrap_or_else(|| {
            let text = String::from_utf8_lossy(body).trim().to_string();
            if text.is_empty() {
                format!("request failed with status {status}")
            } else {
                text
            }
        });

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SyncError::Auth(AuthFailure::from_code(
            parsed.as_ref().and_then(ErrorBody::error_code),
        )),
        StatusCode::NOT_FOUND => SyncError::NotFound { message },
        StatusCode::CONFLICT => SyncError::Conflict { message },
        StatusCode::BAD_REQUEST if operation.is_naming() => SyncError::Conflict { message },
        status if status.is_server_error() => SyncError::Server {
            status: status.as_u16(),
            message,
        },
        status => SyncError::Rejected {
            status: status.as_u16(),
            message,
        },
    }
}

/// Read the body of a failed response and classify it.
pub(crate) async fn classify_response(
    operation: Operation,
    response: reqwest::Response,
) -> SyncError {
    let status = response.status();
    let bytes = response.bytes().await.unwrap_or_default();
    classify_status(operation, status, &bytes)
}
