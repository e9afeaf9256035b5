#![forbid(unsafe_code)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Shared HTTP DTOs for the Folio document backend.
//!
//! These types mirror the JSON bodies exchanged with the backend. Stage codes
//! stay numeric here; the conversion into [`folio_core::Document`] is the single
//! place where they become typed stages.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use folio_core::{
    ClassificationState, Document, FileId, FileType, FolderId, ModelError, TransformState, UserId,
};
pub use folio_core::ProgressSnapshot;

/// Folder owned by a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Folder {
    /// Backend identifier.
    #[serde(rename = "folder_id")]
    pub id: FolderId,
    /// Display name, unique per user.
    #[serde(rename = "folder_name")]
    pub name: String,
    /// Number of documents in the folder.
    #[serde(default)]
    pub file_count: u64,
    /// Last time the folder was opened or refreshed.
    #[serde(default)]
    pub last_activity: Option<DateTime<Utc>>,
}

/// Response body for `GET /folders/{userId}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct FolderListResponse {
    /// Folders ordered most-recently-active first.
    #[serde(default)]
    pub folders: Vec<Folder>,
}

/// Request body for `POST /folders/create`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateFolderRequest {
    /// Owner of the new folder.
    pub user_id: UserId,
    /// Requested folder name.
    pub folder_name: String,
}

/// Response body for `POST /folders/create`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateFolderResponse {
    /// Identifier assigned to the folder.
    pub folder_id: FolderId,
}

/// Request body for folder and category renames.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenameRequest {
    /// Replacement name.
    pub new_name: String,
}

/// Category scoped to one folder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    /// Name, unique within the folder.
    pub name: String,
    /// Owning folder.
    pub folder_id: FolderId,
    /// Last modification time when the backend reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// One entry of a category listing; older backends send bare names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum CategoryEntry {
    /// Bare category name.
    Name(String),
    /// Category with metadata.
    Detailed {
        /// Category name.
        name: String,
        /// Last modification time.
        #[serde(default)]
        updated_at: Option<DateTime<Utc>>,
    },
}

impl CategoryEntry {
    /// Attach the owning folder to produce a [`Category`].
    #[must_use]
    pub fn into_category(self, folder_id: FolderId) -> Category {
        match self {
            Self::Name(name) => Category {
                name,
                folder_id,
                updated_at: None,
            },
            Self::Detailed { name, updated_at } => Category {
                name,
                folder_id,
                updated_at,
            },
        }
    }
}

/// Response body for `GET /folders/{id}/categories`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CategoryListResponse {
    /// Categories in server order.
    #[serde(default)]
    pub categories: Vec<CategoryEntry>,
}

/// Request body for `POST /folders/{id}/categories`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateCategoryRequest {
    /// Requested category name.
    pub category_name: String,
}

/// Document as sent by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileDto {
    /// Backend identifier.
    pub file_id: FileId,
    /// Original file name.
    pub file_name: String,
    /// Optional type token; falls back to the file name's extension.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    /// Extraction stage code (`0` pending, `1` in progress, `2` done).
    #[serde(default)]
    pub transform_state: i64,
    /// Classification stage code (`0` pending, `1` in progress, `2` done, `3` failed).
    #[serde(default)]
    pub classification_state: i64,
    /// Assigned category.
    #[serde(default)]
    pub category: Option<String>,
    /// Set on archives that have been decompressed.
    #[serde(default)]
    pub expanded: bool,
}

impl FileDto {
    /// Resolve the document type from the explicit token or the file name.
    #[must_use]
    pub fn resolved_type(&self) -> FileType {
        self.file_type
            .as_deref()
            .filter(|token| !token.trim().is_empty())
            .map_or_else(
                || FileType::from_file_name(&self.file_name),
                FileType::from_extension,
            )
    }
}

impl TryFrom<FileDto> for Document {
    type Error = ModelError;

    fn try_from(value: FileDto) -> Result<Self, Self::Error> {
        let file_type = value.resolved_type();
        Self::new(
            value.file_id,
            value.file_name,
            file_type,
            TransformState::from_code(value.transform_state)?,
            ClassificationState::from_code(value.classification_state)?,
            value.category,
            value.expanded,
        )
    }
}

impl From<&Document> for FileDto {
    fn from(value: &Document) -> Self {
        Self {
            file_id: value.id(),
            file_name: value.name().to_string(),
            file_type: Some(value.file_type().as_str().to_string()),
            transform_state: value.transform().code(),
            classification_state: value.classification().code(),
            category: value.category().map(str::to_string),
            expanded: value.is_expanded(),
        }
    }
}

/// Response body for the file listing endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct FileListResponse {
    /// Documents in server order.
    #[serde(default)]
    pub files: Vec<FileDto>,
}

/// Request body for `POST /folders/{id}/classify/failed`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetryFailedRequest {
    /// Always `true`; the backend requires the flag.
    pub retry_failed: bool,
}

impl Default for RetryFailedRequest {
    fn default() -> Self {
        Self { retry_failed: true }
    }
}

/// Generic `{message}` acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MessageResponse {
    /// Human-readable acknowledgement.
    #[serde(default)]
    pub message: String,
}

/// Response body for `POST /files/upload/{folderId}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct UploadResponse {
    /// Number of documents accepted.
    #[serde(default)]
    pub uploaded: u64,
    /// Optional acknowledgement text.
    #[serde(default)]
    pub message: Option<String>,
}

/// Response body for `GET /auth/verify`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerifyResponse {
    /// Whether the bearer credential is still valid.
    pub valid: bool,
    /// User the credential belongs to.
    pub user_id: UserId,
}

/// Error detail as produced by the backend framework.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ErrorDetail {
    /// Plain message.
    Message(String),
    /// Machine-readable code with optional message.
    Coded {
        /// Error code such as `invalid_key` or `timeout`.
        error: String,
        /// Optional human-readable text.
        #[serde(default)]
        message: Option<String>,
    },
    /// Field-level validation errors.
    Fields(Vec<Value>),
}

/// Error body returned on non-success responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ErrorBody {
    /// Framework-style `detail` member.
    #[serde(default)]
    pub detail: Option<ErrorDetail>,
    /// Alternative top-level message.
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Human-readable message, preferring the most specific field.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match &self.detail {
            Some(ErrorDetail::Message(message)) => Some(message.clone()),
            Some(ErrorDetail::Coded { error, message }) => {
                Some(message.clone().unwrap_or_else(|| error.clone()))
            }
            Some(ErrorDetail::Fields(fields)) => fields
                .iter()
                .find_map(|field| field.get("msg").and_then(Value::as_str))
                .map(str::to_string)
                .or_else(|| self.message.clone()),
            None => self.message.clone(),
        }
    }

    /// Machine-readable error code, when present.
    #[must_use]
    pub fn error_code(&self) -> Option<&str> {
        match &self.detail {
            Some(ErrorDetail::Coded { error, .. }) => Some(error.as_str()),
            _ => None,
        }
    }
}
