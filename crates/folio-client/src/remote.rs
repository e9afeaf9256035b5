//! Backend capability surface.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use folio_api_models::{Category, Folder};
use folio_core::{Document, FileId, FolderId, ProgressSnapshot, UserId};

use crate::error::SyncResult;

static FIRST_NUMBER: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\d+").ok());

/// Result of decompressing an archive document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandOutcome {
    /// Number of documents created, when the server message states it.
    pub extracted: Option<u64>,
    /// Server acknowledgement, verbatim.
    pub message: String,
}

impl ExpandOutcome {
    /// Parse the server acknowledgement (e.g. `"3 files extracted"`).
    #[must_use]
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let extracted = FIRST_NUMBER
            .as_ref()
            .and_then(|pattern| pattern.find(&message))
            .and_then(|found| found.as_str().parse::<u64>().ok());
        Self { extracted, message }
    }
}

/// Binary payload returned by the download endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPayload {
    /// File name suggested by the server.
    pub file_name: Option<String>,
    /// Payload bytes.
    pub bytes: Vec<u8>,
}

/// Local file queued for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// Name the backend stores the document under.
    pub file_name: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

/// One operation per backend capability.
///
/// Every call except the two classification triggers is safe to retry on a
/// transport failure. The triggers only confirm that the request was accepted;
/// completion is observed through later progress and list fetches.
#[async_trait]
pub trait RemoteSync: Send + Sync {
    /// Folders owned by `user_id`, most-recently-active first.
    async fn list_folders(&self, user_id: UserId) -> SyncResult<Vec<Folder>>;
    /// Create a folder; `Conflict` when the name is taken.
    async fn create_folder(&self, user_id: UserId, name: &str) -> SyncResult<FolderId>;
    /// Rename a folder; `Conflict` when the name is taken.
    async fn rename_folder(&self, folder_id: FolderId, name: &str) -> SyncResult<()>;
    /// Delete a folder and everything beneath it.
    async fn delete_folder(&self, folder_id: FolderId) -> SyncResult<()>;
    /// Categories of a folder in server order.
    async fn list_categories(&self, folder_id: FolderId) -> SyncResult<Vec<Category>>;
    /// Create a category; `Conflict` when the name is taken.
    async fn create_category(&self, folder_id: FolderId, name: &str) -> SyncResult<()>;
    /// Rename a category; `Conflict` when the new name is taken.
    async fn rename_category(
        &self,
        folder_id: FolderId,
        old_name: &str,
        new_name: &str,
    ) -> SyncResult<()>;
    /// Delete a category; its documents become unclassified.
    async fn delete_category(&self, folder_id: FolderId, name: &str) -> SyncResult<()>;
    /// Documents assigned to a category.
    async fn list_category_files(&self, folder_id: FolderId, name: &str)
    -> SyncResult<Vec<Document>>;
    /// Documents without a category.
    async fn list_unclassified_files(&self, folder_id: FolderId) -> SyncResult<Vec<Document>>;
    /// Folder-level progress counts.
    async fn get_progress(&self, folder_id: FolderId) -> SyncResult<ProgressSnapshot>;
    /// Queue every waiting document for classification. Not retried.
    async fn request_classification(&self, folder_id: FolderId) -> SyncResult<()>;
    /// Re-queue failed documents. Not retried.
    async fn retry_failed_classification(&self, folder_id: FolderId) -> SyncResult<()>;
    /// Delete one document.
    async fn delete_file(&self, file_id: FileId) -> SyncResult<()>;
    /// Decompress an archive document into new documents.
    async fn expand_archive(&self, folder_id: FolderId, file_id: FileId)
    -> SyncResult<ExpandOutcome>;
    /// Upload documents into a folder; returns the number accepted.
    async fn upload_files(&self, folder_id: FolderId, files: Vec<UploadFile>) -> SyncResult<u64>;
    /// Whole-folder archive.
    async fn download_folder(&self, folder_id: FolderId) -> SyncResult<DownloadPayload>;
    /// Archive of one category.
    async fn download_category(&self, folder_id: FolderId, name: &str)
    -> SyncResult<DownloadPayload>;
    /// Single document.
    async fn download_file(&self, file_id: FileId) -> SyncResult<DownloadPayload>;
    /// Confirm the configured credential; returns the user it belongs to.
    async fn verify_session(&self) -> SyncResult<UserId>;
}
