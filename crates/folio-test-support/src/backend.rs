//! In-memory stand-in for the document backend.
//!
//! Behaves like the REST service for the purposes of controller tests: names
//! are unique per owner (folders) or per folder (categories), deleting a
//! category unclassifies its documents, and archive expansion replaces the
//! archive with freshly uploaded members. Pipeline progress is driven
//! explicitly by the test through [`InMemoryBackend::complete_transforms`] and
//! [`InMemoryBackend::complete_classification`]. With
//! [`InMemoryBackend::defer_classification_starts`] an accepted trigger only
//! queues work until [`InMemoryBackend::start_queued_classification`] runs.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;

use folio_api_models::{Category, Folder};
use folio_client::{
    AuthFailure, DownloadPayload, ExpandOutcome, Operation, RemoteSync, SyncError, SyncResult,
    UploadFile,
};
use folio_core::{
    ClassificationState, Document, FileId, FileType, FolderId, ProgressSnapshot, TransformState,
    UserId, aggregate,
};

const EPOCH_SECONDS: i64 = 1_700_000_000;

/// Picks a category for a document, or `None` to fail its classification.
pub type Classifier = Arc<dyn Fn(&str, &[String]) -> Option<String> + Send + Sync>;

#[derive(Debug, Clone)]
struct FolderRecord {
    id: FolderId,
    owner: UserId,
    name: String,
    categories: Vec<String>,
    touched: i64,
}

#[derive(Debug, Clone)]
struct FileRecord {
    id: FileId,
    folder_id: FolderId,
    name: String,
    transform: TransformState,
    classification: ClassificationState,
    category: Option<String>,
    expanded: bool,
    members: Vec<String>,
}

impl FileRecord {
    fn file_type(&self) -> FileType {
        FileType::from_file_name(&self.name)
    }

    fn to_document(&self) -> Option<Document> {
        Document::new(
            self.id,
            self.name.clone(),
            self.file_type(),
            self.transform,
            self.classification,
            self.category.clone(),
            self.expanded,
        )
        .ok()
    }
}

/// Seed description for one document.
#[derive(Debug, Clone)]
pub struct SeedDocument {
    name: String,
    transform: TransformState,
    classification: ClassificationState,
    category: Option<String>,
}

impl SeedDocument {
    /// Freshly uploaded document.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: TransformState::Pending,
            classification: ClassificationState::Pending,
            category: None,
        }
    }

    /// Set the extraction stage.
    #[must_use]
    pub const fn transform(mut self, state: TransformState) -> Self {
        self.transform = state;
        self
    }

    /// Set the classification stage.
    #[must_use]
    pub const fn classification(mut self, state: ClassificationState) -> Self {
        self.classification = state;
        self
    }

    /// Classified into `category` (implies both stages done).
    #[must_use]
    pub fn classified(mut self, category: impl Into<String>) -> Self {
        self.transform = TransformState::Done;
        self.classification = ClassificationState::Done;
        self.category = Some(category.into());
        self
    }
}

struct State {
    user_id: UserId,
    folders: Vec<FolderRecord>,
    files: Vec<FileRecord>,
    next_folder_id: FolderId,
    next_file_id: FileId,
    clock: i64,
    calls: HashMap<Operation, usize>,
    failures: HashMap<Operation, VecDeque<SyncError>>,
    session_failure: Option<AuthFailure>,
    classifier: Classifier,
    defer_starts: bool,
    queued_starts: Vec<(FolderId, StartKind)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StartKind {
    Waiting,
    Failed,
}

impl State {
    fn start_classification(&mut self, folder_id: FolderId, kind: StartKind) {
        for file in self.files.iter_mut().filter(|file| {
            file.folder_id == folder_id
                && match kind {
                    StartKind::Waiting => {
                        file.transform == TransformState::Done
                            && file.classification == ClassificationState::Pending
                            && !file.file_type().is_archive()
                    }
                    StartKind::Failed => file.classification == ClassificationState::Failed,
                }
        }) {
            file.classification = ClassificationState::InProgress;
        }
    }

    fn accept_classification(&mut self, folder_id: FolderId, kind: StartKind) {
        if self.defer_starts {
            self.queued_starts.push((folder_id, kind));
        } else {
            self.start_classification(folder_id, kind);
        }
    }

    fn tick(&mut self) -> i64 {
        self.clock += 1;
        self.clock
    }

    fn folder(&self, folder_id: FolderId) -> SyncResult<&FolderRecord> {
        self.folders
            .iter()
            .find(|folder| folder.id == folder_id)
            .ok_or_else(|| not_found(format!("folder {folder_id} not found")))
    }

    fn folder_mut(&mut self, folder_id: FolderId) -> SyncResult<&mut FolderRecord> {
        self.folders
            .iter_mut()
            .find(|folder| folder.id == folder_id)
            .ok_or_else(|| not_found(format!("folder {folder_id} not found")))
    }

    fn documents(&self, folder_id: FolderId) -> Vec<Document> {
        self.files
            .iter()
            .filter(|file| file.folder_id == folder_id)
            .filter_map(FileRecord::to_document)
            .collect()
    }

    fn push_file(&mut self, folder_id: FolderId, seed: SeedDocument, members: Vec<String>) -> FileId {
        let id = self.next_file_id;
        self.next_file_id += 1;
        self.files.push(FileRecord {
            id,
            folder_id,
            name: seed.name,
            transform: seed.transform,
            classification: seed.classification,
            category: seed.category,
            expanded: false,
            members,
        });
        id
    }
}

fn not_found(message: impl Into<String>) -> SyncError {
    SyncError::NotFound {
        message: message.into(),
    }
}

fn conflict(message: impl Into<String>) -> SyncError {
    SyncError::Conflict {
        message: message.into(),
    }
}

fn timestamp(tick: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(EPOCH_SECONDS + tick, 0)
}

fn first_category(_name: &str, categories: &[String]) -> Option<String> {
    categories.first().cloned()
}

struct Inner {
    state: Mutex<State>,
    gates: Mutex<HashMap<Operation, Arc<Semaphore>>>,
}

/// Shared, cloneable in-memory backend.
#[derive(Clone)]
pub struct InMemoryBackend {
    inner: Arc<Inner>,
}

impl InMemoryBackend {
    /// Empty backend whose session belongs to `user_id`.
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    user_id,
                    folders: Vec::new(),
                    files: Vec::new(),
                    next_folder_id: 1,
                    next_file_id: 1,
                    clock: 0,
                    calls: HashMap::new(),
                    failures: HashMap::new(),
                    session_failure: None,
                    classifier: Arc::new(first_category),
                    defer_starts: false,
                    queued_starts: Vec::new(),
                }),
                gates: Mutex::new(HashMap::new()),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn gate(&self, operation: Operation) -> Option<Arc<Semaphore>> {
        self.inner
            .gates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&operation)
            .cloned()
    }

    async fn enter(&self, operation: Operation) -> SyncResult<()> {
        if let Some(gate) = self.gate(operation) {
            gate.acquire()
                .await
                .map_err(|_| SyncError::transport(operation, "gate closed"))?
                .forget();
        }
        let mut state = self.lock();
        *state.calls.entry(operation).or_default() += 1;
        if let Some(failure) = state.session_failure {
            return Err(SyncError::Auth(failure));
        }
        if let Some(err) = state
            .failures
            .get_mut(&operation)
            .and_then(VecDeque::pop_front)
        {
            return Err(err);
        }
        Ok(())
    }

    // ---- seeding -------------------------------------------------------

    /// Create a folder owned by the session user.
    pub fn seed_folder(&self, name: &str) -> FolderId {
        let mut state = self.lock();
        let owner = state.user_id;
        Self::insert_folder(&mut state, owner, name)
    }

    /// Create a folder owned by someone else.
    pub fn seed_foreign_folder(&self, owner: UserId, name: &str) -> FolderId {
        Self::insert_folder(&mut self.lock(), owner, name)
    }

    fn insert_folder(state: &mut State, owner: UserId, name: &str) -> FolderId {
        let id = state.next_folder_id;
        state.next_folder_id += 1;
        let touched = state.tick();
        state.folders.push(FolderRecord {
            id,
            owner,
            name: name.to_string(),
            categories: Vec::new(),
            touched,
        });
        id
    }

    /// Add a category to a folder.
    ///
    /// # Panics
    /// Panics when the folder does not exist.
    pub fn seed_category(&self, folder_id: FolderId, name: &str) {
        let mut state = self.lock();
        let folder = state.folder_mut(folder_id).expect("seeded folder exists");
        folder.categories.push(name.to_string());
    }

    /// Add a document to a folder.
    pub fn seed_document(&self, folder_id: FolderId, seed: SeedDocument) -> FileId {
        self.lock().push_file(folder_id, seed, Vec::new())
    }

    /// Add a ZIP document whose expansion yields `members`.
    pub fn seed_archive(&self, folder_id: FolderId, name: &str, members: &[&str]) -> FileId {
        let members = members.iter().map(ToString::to_string).collect();
        self.lock()
            .push_file(folder_id, SeedDocument::new(name), members)
    }

    // ---- pipeline ------------------------------------------------------

    /// Finish text extraction for every supported document of a folder.
    pub fn complete_transforms(&self, folder_id: FolderId) {
        for file in self
            .lock()
            .files
            .iter_mut()
            .filter(|file| file.folder_id == folder_id)
        {
            let file_type = file.file_type();
            if file_type.is_supported() && !file_type.is_archive() {
                file.transform = TransformState::Done;
            }
        }
    }

    /// Run the classifier over every queued document of a folder.
    pub fn complete_classification(&self, folder_id: FolderId) {
        let mut state = self.lock();
        let categories = state
            .folder(folder_id)
            .map(|folder| folder.categories.clone())
            .unwrap_or_default();
        let classifier = Arc::clone(&state.classifier);
        for file in state.files.iter_mut().filter(|file| {
            file.folder_id == folder_id && file.classification == ClassificationState::InProgress
        }) {
            match classifier(&file.name, &categories) {
                Some(category) => {
                    file.classification = ClassificationState::Done;
                    file.category = Some(category);
                }
                None => file.classification = ClassificationState::Failed,
            }
        }
    }

    /// Queue accepted classification triggers instead of starting them, the
    /// way a backend with a busy worker does.
    pub fn defer_classification_starts(&self, defer: bool) {
        self.lock().defer_starts = defer;
    }

    /// Start every queued trigger of a folder. Returns how many were queued.
    #[must_use]
    pub fn start_queued_classification(&self, folder_id: FolderId) -> usize {
        let mut state = self.lock();
        let (ready, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut state.queued_starts)
            .into_iter()
            .partition(|(folder, _)| *folder == folder_id);
        state.queued_starts = rest;
        for (folder, kind) in &ready {
            state.start_classification(*folder, *kind);
        }
        ready.len()
    }

    /// Replace the classifier (default: first category, fail when none).
    pub fn set_classifier<F>(&self, classifier: F)
    where
        F: Fn(&str, &[String]) -> Option<String> + Send + Sync + 'static,
    {
        self.lock().classifier = Arc::new(classifier);
    }

    // ---- fault injection & inspection ---------------------------------

    /// Fail the next call of `operation` with `err`.
    pub fn fail_next(&self, operation: Operation, err: SyncError) {
        self.lock()
            .failures
            .entry(operation)
            .or_default()
            .push_back(err);
    }

    /// Make every subsequent call fail with an auth error.
    pub fn expire_session(&self, failure: AuthFailure) {
        self.lock().session_failure = Some(failure);
    }

    /// Block calls of `operation` until [`Self::release`] is called.
    pub fn hold(&self, operation: Operation) {
        self.inner
            .gates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(operation, Arc::new(Semaphore::new(0)));
    }

    /// Let one held call of `operation` proceed.
    pub fn release(&self, operation: Operation) {
        if let Some(gate) = self.gate(operation) {
            gate.add_permits(1);
        }
    }

    /// Stop holding `operation` and release any waiters.
    pub fn unhold(&self, operation: Operation) {
        let gate = self
            .inner
            .gates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&operation);
        if let Some(gate) = gate {
            gate.add_permits(Semaphore::MAX_PERMITS / 2);
        }
    }

    /// Number of calls received for `operation`.
    #[must_use]
    pub fn calls(&self, operation: Operation) -> usize {
        self.lock().calls.get(&operation).copied().unwrap_or(0)
    }

    /// Every document of a folder, in insertion order.
    #[must_use]
    pub fn documents(&self, folder_id: FolderId) -> Vec<Document> {
        self.lock().documents(folder_id)
    }

    /// Current folder name, if it exists.
    #[must_use]
    pub fn folder_name(&self, folder_id: FolderId) -> Option<String> {
        self.lock()
            .folder(folder_id)
            .ok()
            .map(|folder| folder.name.clone())
    }

    /// Current category names of a folder.
    #[must_use]
    pub fn category_names(&self, folder_id: FolderId) -> Vec<String> {
        self.lock()
            .folder(folder_id)
            .map(|folder| folder.categories.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl RemoteSync for InMemoryBackend {
    async fn list_folders(&self, user_id: UserId) -> SyncResult<Vec<Folder>> {
        self.enter(Operation::ListFolders).await?;
        let state = self.lock();
        let mut owned: Vec<&FolderRecord> = state
            .folders
            .iter()
            .filter(|folder| folder.owner == user_id)
            .collect();
        owned.sort_by(|left, right| right.touched.cmp(&left.touched));
        Ok(owned
            .into_iter()
            .map(|folder| Folder {
                id: folder.id,
                name: folder.name.clone(),
                file_count: state
                    .files
                    .iter()
                    .filter(|file| file.folder_id == folder.id)
                    .count() as u64,
                last_activity: timestamp(folder.touched),
            })
            .collect())
    }

    async fn create_folder(&self, user_id: UserId, name: &str) -> SyncResult<FolderId> {
        self.enter(Operation::CreateFolder).await?;
        let mut state = self.lock();
        if state
            .folders
            .iter()
            .any(|folder| folder.owner == user_id && folder.name == name)
        {
            return Err(conflict("folder name already exists"));
        }
        Ok(Self::insert_folder(&mut state, user_id, name))
    }

    async fn rename_folder(&self, folder_id: FolderId, name: &str) -> SyncResult<()> {
        self.enter(Operation::RenameFolder).await?;
        let mut state = self.lock();
        let owner = state.folder(folder_id)?.owner;
        if state
            .folders
            .iter()
            .any(|folder| folder.owner == owner && folder.id != folder_id && folder.name == name)
        {
            return Err(conflict("folder name already exists"));
        }
        let touched = state.tick();
        let folder = state.folder_mut(folder_id)?;
        folder.name = name.to_string();
        folder.touched = touched;
        Ok(())
    }

    async fn delete_folder(&self, folder_id: FolderId) -> SyncResult<()> {
        self.enter(Operation::DeleteFolder).await?;
        let mut state = self.lock();
        state.folder(folder_id)?;
        state.folders.retain(|folder| folder.id != folder_id);
        state.files.retain(|file| file.folder_id != folder_id);
        Ok(())
    }

    async fn list_categories(&self, folder_id: FolderId) -> SyncResult<Vec<Category>> {
        self.enter(Operation::ListCategories).await?;
        let state = self.lock();
        Ok(state
            .folder(folder_id)?
            .categories
            .iter()
            .map(|name| Category {
                name: name.clone(),
                folder_id,
                updated_at: None,
            })
            .collect())
    }

    async fn create_category(&self, folder_id: FolderId, name: &str) -> SyncResult<()> {
        self.enter(Operation::CreateCategory).await?;
        let mut state = self.lock();
        let touched = state.tick();
        let folder = state.folder_mut(folder_id)?;
        if folder.categories.iter().any(|existing| existing == name) {
            return Err(conflict("category name already exists"));
        }
        folder.categories.push(name.to_string());
        folder.touched = touched;
        Ok(())
    }

    async fn rename_category(
        &self,
        folder_id: FolderId,
        old_name: &str,
        new_name: &str,
    ) -> SyncResult<()> {
        self.enter(Operation::RenameCategory).await?;
        let mut state = self.lock();
        let folder = state.folder_mut(folder_id)?;
        if folder.categories.iter().any(|existing| existing == new_name) {
            return Err(conflict("category name already exists"));
        }
        let slot = folder
            .categories
            .iter_mut()
            .find(|existing| existing.as_str() == old_name)
            .ok_or_else(|| not_found(format!("category '{old_name}' not found")))?;
        *slot = new_name.to_string();
        for file in state
            .files
            .iter_mut()
            .filter(|file| file.folder_id == folder_id && file.category.as_deref() == Some(old_name))
        {
            file.category = Some(new_name.to_string());
        }
        Ok(())
    }

    async fn delete_category(&self, folder_id: FolderId, name: &str) -> SyncResult<()> {
        self.enter(Operation::DeleteCategory).await?;
        let mut state = self.lock();
        let folder = state.folder_mut(folder_id)?;
        let before = folder.categories.len();
        folder.categories.retain(|existing| existing != name);
        if folder.categories.len() == before {
            return Err(not_found(format!("category '{name}' not found")));
        }
        for file in state
            .files
            .iter_mut()
            .filter(|file| file.folder_id == folder_id && file.category.as_deref() == Some(name))
        {
            file.category = None;
            file.classification = ClassificationState::Pending;
        }
        Ok(())
    }

    async fn list_category_files(
        &self,
        folder_id: FolderId,
        name: &str,
    ) -> SyncResult<Vec<Document>> {
        self.enter(Operation::ListCategoryFiles).await?;
        let state = self.lock();
        if !state.folder(folder_id)?.categories.iter().any(|c| c == name) {
            return Err(not_found(format!("category '{name}' not found")));
        }
        Ok(state
            .documents(folder_id)
            .into_iter()
            .filter(|doc| doc.category() == Some(name))
            .collect())
    }

    async fn list_unclassified_files(&self, folder_id: FolderId) -> SyncResult<Vec<Document>> {
        self.enter(Operation::ListUnclassified).await?;
        let state = self.lock();
        state.folder(folder_id)?;
        Ok(state
            .documents(folder_id)
            .into_iter()
            .filter(Document::is_unclassified)
            .collect())
    }

    async fn get_progress(&self, folder_id: FolderId) -> SyncResult<ProgressSnapshot> {
        self.enter(Operation::Progress).await?;
        let state = self.lock();
        state.folder(folder_id)?;
        Ok(aggregate(&state.documents(folder_id)))
    }

    async fn request_classification(&self, folder_id: FolderId) -> SyncResult<()> {
        self.enter(Operation::Classify).await?;
        let mut state = self.lock();
        state.folder(folder_id)?;
        state.accept_classification(folder_id, StartKind::Waiting);
        Ok(())
    }

    async fn retry_failed_classification(&self, folder_id: FolderId) -> SyncResult<()> {
        self.enter(Operation::RetryFailed).await?;
        let mut state = self.lock();
        state.folder(folder_id)?;
        state.accept_classification(folder_id, StartKind::Failed);
        Ok(())
    }

    async fn delete_file(&self, file_id: FileId) -> SyncResult<()> {
        self.enter(Operation::DeleteFile).await?;
        let mut state = self.lock();
        let before = state.files.len();
        state.files.retain(|file| file.id != file_id);
        if state.files.len() == before {
            return Err(not_found(format!("file {file_id} not found")));
        }
        Ok(())
    }

    async fn expand_archive(
        &self,
        folder_id: FolderId,
        file_id: FileId,
    ) -> SyncResult<ExpandOutcome> {
        self.enter(Operation::ExpandArchive).await?;
        let mut state = self.lock();
        state.folder(folder_id)?;
        let position = state
            .files
            .iter()
            .position(|file| file.id == file_id && file.folder_id == folder_id)
            .ok_or_else(|| not_found(format!("file {file_id} not found")))?;
        if !state.files[position].file_type().is_archive() {
            return Err(SyncError::Rejected {
                status: 400,
                message: "only zip files can be extracted".into(),
            });
        }
        let archive = state.files.remove(position);
        for member in &archive.members {
            state.push_file(folder_id, SeedDocument::new(member.clone()), Vec::new());
        }
        Ok(ExpandOutcome::from_message(format!(
            "{} files extracted",
            archive.members.len()
        )))
    }

    async fn upload_files(&self, folder_id: FolderId, files: Vec<UploadFile>) -> SyncResult<u64> {
        self.enter(Operation::Upload).await?;
        let mut state = self.lock();
        state.folder(folder_id)?;
        let count = files.len() as u64;
        for file in files {
            state.push_file(folder_id, SeedDocument::new(file.file_name), Vec::new());
        }
        Ok(count)
    }

    async fn download_folder(&self, folder_id: FolderId) -> SyncResult<DownloadPayload> {
        self.enter(Operation::Download).await?;
        let state = self.lock();
        let folder = state.folder(folder_id)?;
        let listing: Vec<String> = state
            .documents(folder_id)
            .iter()
            .map(|doc| doc.name().to_string())
            .collect();
        Ok(DownloadPayload {
            file_name: Some(format!("{}.zip", folder.name)),
            bytes: listing.join("\n").into_bytes(),
        })
    }

    async fn download_category(
        &self,
        folder_id: FolderId,
        name: &str,
    ) -> SyncResult<DownloadPayload> {
        self.enter(Operation::Download).await?;
        let state = self.lock();
        if !state.folder(folder_id)?.categories.iter().any(|c| c == name) {
            return Err(not_found(format!("category '{name}' not found")));
        }
        let listing: Vec<String> = state
            .documents(folder_id)
            .iter()
            .filter(|doc| doc.category() == Some(name))
            .map(|doc| doc.name().to_string())
            .collect();
        Ok(DownloadPayload {
            file_name: Some(format!("{name}.zip")),
            bytes: listing.join("\n").into_bytes(),
        })
    }

    async fn download_file(&self, file_id: FileId) -> SyncResult<DownloadPayload> {
        self.enter(Operation::Download).await?;
        let state = self.lock();
        let file = state
            .files
            .iter()
            .find(|file| file.id == file_id)
            .ok_or_else(|| not_found(format!("file {file_id} not found")))?;
        Ok(DownloadPayload {
            file_name: Some(file.name.clone()),
            bytes: format!("contents of {}", file.name).into_bytes(),
        })
    }

    async fn verify_session(&self) -> SyncResult<UserId> {
        self.enter(Operation::VerifySession).await?;
        Ok(self.lock().user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn duplicate_folder_names_conflict_per_owner() {
        let backend = InMemoryBackend::new(1);
        backend.seed_folder("Reports");
        backend.seed_foreign_folder(2, "Reports");

        let err = backend
            .create_folder(1, "Reports")
            .await
            .expect_err("duplicate");
        assert!(matches!(err, SyncError::Conflict { .. }));
        assert!(backend.create_folder(2, "Taxes").await.is_ok());
    }

    #[tokio::test]
    async fn folders_are_listed_most_recent_first() {
        let backend = InMemoryBackend::new(1);
        let older = backend.seed_folder("Older");
        let newer = backend.seed_folder("Newer");
        let ids: Vec<_> = backend
            .list_folders(1)
            .await
            .expect("list")
            .iter()
            .map(|folder| folder.id)
            .collect();
        assert_eq!(ids, vec![newer, older]);

        backend.rename_folder(older, "Renamed").await.expect("rename");
        let first = backend.list_folders(1).await.expect("list")[0].id;
        assert_eq!(first, older);
    }

    #[tokio::test]
    async fn classification_pipeline_moves_documents_into_categories() {
        let backend = InMemoryBackend::new(1);
        let folder = backend.seed_folder("Reports");
        backend.seed_category(folder, "Invoices");
        backend.seed_document(folder, SeedDocument::new("a.pdf").transform(TransformState::Done));

        backend.request_classification(folder).await.expect("accepted");
        let progress = backend.get_progress(folder).await.expect("progress");
        assert_eq!(progress.classification_pending, 1);

        backend.complete_classification(folder);
        let invoices = backend
            .list_category_files(folder, "Invoices")
            .await
            .expect("files");
        assert_eq!(invoices.len(), 1);
        assert!(backend
            .list_unclassified_files(folder)
            .await
            .expect("unclassified")
            .is_empty());
    }

    #[tokio::test]
    async fn deferred_triggers_wait_for_the_worker() {
        let backend = InMemoryBackend::new(1);
        let folder = backend.seed_folder("Reports");
        backend.seed_document(folder, SeedDocument::new("a.pdf").transform(TransformState::Done));
        backend.defer_classification_starts(true);

        backend.request_classification(folder).await.expect("accepted");
        let progress = backend.get_progress(folder).await.expect("progress");
        assert_eq!(progress.classification_waiting, 1);
        assert_eq!(progress.classification_pending, 0);

        assert_eq!(backend.start_queued_classification(folder), 1);
        let progress = backend.get_progress(folder).await.expect("progress");
        assert_eq!(progress.classification_pending, 1);
        assert_eq!(backend.start_queued_classification(folder), 0);
    }

    #[tokio::test]
    async fn injected_failures_are_consumed_once() {
        let backend = InMemoryBackend::new(1);
        let folder = backend.seed_folder("Reports");
        backend.fail_next(
            Operation::Progress,
            SyncError::transport(Operation::Progress, "reset"),
        );
        assert!(backend.get_progress(folder).await.is_err());
        assert!(backend.get_progress(folder).await.is_ok());
        assert_eq!(backend.calls(Operation::Progress), 2);
    }
}
