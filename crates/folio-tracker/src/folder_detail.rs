//! Folder detail view: categories, unclassified documents and progress.
//!
//! # Design
//! - Every fetch takes a [`Ticket`]; responses that arrive after an unmount are
//!   dropped, and each list is replaced wholesale (last response wins).
//! - Read failures keep the last-known data and record a notice.
//! - Mutations publish a dirty marker so other views re-fetch on focus.
//! - A poller refreshes progress while the view is mounted and re-fetches the
//!   lists whenever the snapshot changes, and every [`LIST_REFRESH_TICKS`]
//!   ticks regardless, since moves and paired upload/delete keep counts equal.
//! - A classification trigger stays outstanding until progress shows its work
//!   was picked up and settled; see [`crate::classification`].

use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use folio_api_models::Category;
use folio_client::{DownloadPayload, ExpandOutcome, RemoteSync, SyncError, SyncResult, UploadFile};
use folio_core::{Document, FileId, FolderId, ProgressSnapshot};
use folio_events::{MarkerObserver, SharedMarkerStore};

use crate::classification::{
    ClassificationOutcome, PendingClassification, PickupStatus, TriggerKind,
};
use crate::download::DownloadSink;
use crate::epoch::{RequestEpoch, Ticket};
use crate::error::{TrackerError, TrackerResult};
use crate::mutation::{Confirmation, MutationState, NameDialog, PendingDeletion};
use crate::notice::{Notice, NoticeBoard, NoticeKind};
use crate::poller::{DEFAULT_POLL_INTERVAL, PollerHandle, spawn_poller};

/// Category whose documents are currently listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenCategory {
    /// Category name.
    pub name: String,
    /// Documents assigned to it.
    pub documents: Vec<Document>,
}

/// What the folder detail view shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderDetailState {
    /// Categories in server order.
    pub categories: Vec<Category>,
    /// Documents without a category.
    pub unclassified: Vec<Document>,
    /// Whether the unclassified section is expanded.
    pub unclassified_expanded: bool,
    /// Category being browsed.
    pub open_category: Option<OpenCategory>,
    /// Latest progress snapshot.
    pub progress: Option<ProgressSnapshot>,
    /// Latest mutation outcome.
    pub mutation: MutationState,
    /// Pending notices.
    pub notices: NoticeBoard,
    /// A classification trigger is in flight.
    pub classification_in_flight: bool,
    /// Accepted trigger whose work has not been seen to settle.
    pub pending_classification: Option<PendingClassification>,
}

impl FolderDetailState {
    fn find_document(&self, file_id: FileId) -> Option<&Document> {
        self.unclassified
            .iter()
            .chain(
                self.open_category
                    .iter()
                    .flat_map(|open| open.documents.iter()),
            )
            .find(|doc| doc.id() == file_id)
    }

    fn classification_unsettled(&self) -> bool {
        self.classification_in_flight
            || self.pending_classification.is_some()
            || self
                .progress
                .is_some_and(|progress| progress.classification_pending > 0)
    }
}

#[derive(Default)]
struct ProgressChange {
    changed: bool,
    classification_completed: bool,
    pickup_expired: bool,
}

fn apply_progress(
    state: &mut FolderDetailState,
    snapshot: ProgressSnapshot,
    now: DateTime<Utc>,
) -> ProgressChange {
    let previous = state.progress.replace(snapshot);
    let mut change = ProgressChange {
        changed: previous != Some(snapshot),
        ..ProgressChange::default()
    };
    if let Some(pending) = state.pending_classification.as_mut() {
        match pending.observe(&snapshot, now) {
            PickupStatus::Finished => {
                state.pending_classification = None;
                change.classification_completed = true;
            }
            PickupStatus::Expired => {
                state.pending_classification = None;
                change.pickup_expired = true;
            }
            PickupStatus::Queued | PickupStatus::Running => {}
        }
    } else {
        // Work started elsewhere: completion is the running bucket emptying.
        change.classification_completed = previous
            .is_some_and(|progress| progress.classification_pending > 0)
            && snapshot.classification_settled();
    }
    change
}

/// Poll ticks between unconditional list re-fetches.
pub const LIST_REFRESH_TICKS: u32 = 5;

struct Shared {
    remote: Arc<dyn RemoteSync>,
    markers: SharedMarkerStore,
    folder_id: FolderId,
    state: Mutex<FolderDetailState>,
    observer: Mutex<MarkerObserver>,
    epoch: RequestEpoch,
    ticks: AtomicU32,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, FolderDetailState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn observer(&self) -> MutexGuard<'_, MarkerObserver> {
        self.observer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self) {
        match self.markers.publish() {
            Ok(marker) => debug!(folder_id = self.folder_id, marker, "dirty marker published"),
            Err(err) => warn!(folder_id = self.folder_id, error = %err, "failed to publish dirty marker"),
        }
    }

    fn apply<T>(
        &self,
        ticket: Ticket,
        context: &str,
        result: SyncResult<T>,
        apply: impl FnOnce(&mut FolderDetailState, T),
    ) -> TrackerResult<()> {
        let mut state = self.state();
        if !self.epoch.is_current(ticket) {
            debug!(folder_id = self.folder_id, context, "discarding stale response");
            return Ok(());
        }
        match result {
            Ok(value) => {
                apply(&mut state, value);
                Ok(())
            }
            Err(err) => {
                state.notices.report(context, &err);
                Err(err.into())
            }
        }
    }

    async fn fetch_categories(&self) -> TrackerResult<()> {
        let ticket = self.epoch.ticket();
        let result = self.remote.list_categories(self.folder_id).await;
        self.apply(ticket, "failed to load categories", result, |state, categories| {
            state.categories = categories;
        })
    }

    async fn fetch_unclassified(&self) -> TrackerResult<()> {
        let ticket = self.epoch.ticket();
        let result = self.remote.list_unclassified_files(self.folder_id).await;
        self.apply(ticket, "failed to load unclassified documents", result, |state, docs| {
            state.unclassified = docs;
        })
    }

    async fn fetch_open_category(&self) -> TrackerResult<()> {
        let Some(name) = self.state().open_category.as_ref().map(|open| open.name.clone()) else {
            return Ok(());
        };
        let ticket = self.epoch.ticket();
        let result = self.remote.list_category_files(self.folder_id, &name).await;
        if let Err(err) = &result
            && err.is_not_found()
        {
            let mut state = self.state();
            if state.open_category.as_ref().is_some_and(|open| open.name == name) {
                debug!(folder_id = self.folder_id, category = %name, "open category was deleted");
                state.open_category = None;
            }
            return Ok(());
        }
        self.apply(ticket, "failed to load category documents", result, |state, docs| {
            if let Some(open) = state.open_category.as_mut().filter(|open| open.name == name) {
                open.documents = docs;
            }
        })
    }

    async fn fetch_progress(&self) -> TrackerResult<ProgressChange> {
        let ticket = self.epoch.ticket();
        let result = self.remote.get_progress(self.folder_id).await;
        let mut change = ProgressChange::default();
        self.apply(ticket, "failed to load progress", result, |state, snapshot| {
            change = apply_progress(state, snapshot, Utc::now());
        })?;
        if change.pickup_expired {
            warn!(
                folder_id = self.folder_id,
                "classification trigger was never picked up; allowing a new one"
            );
        }
        if change.classification_completed {
            info!(folder_id = self.folder_id, "classification settled");
            self.publish();
        }
        Ok(change)
    }

    async fn refresh_all(&self) -> TrackerResult<()> {
        let (categories, unclassified, progress, open) = tokio::join!(
            self.fetch_categories(),
            self.fetch_unclassified(),
            self.fetch_progress(),
            self.fetch_open_category(),
        );
        categories?;
        unclassified?;
        progress?;
        open
    }

    async fn poll_once(&self) -> ControlFlow<()> {
        let ticket = self.epoch.ticket();
        let tick = self.ticks.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        match self.fetch_progress().await {
            _ if !self.epoch.is_current(ticket) => ControlFlow::Break(()),
            Ok(change) => {
                if change.changed || tick % LIST_REFRESH_TICKS == 0 {
                    let _ = tokio::join!(self.fetch_unclassified(), self.fetch_open_category());
                }
                ControlFlow::Continue(())
            }
            Err(err) if err.session_failure().is_some() => ControlFlow::Break(()),
            Err(_) => ControlFlow::Continue(()),
        }
    }

    fn begin(&self) {
        self.state().mutation = MutationState::Submitting;
    }

    fn commit(&self) {
        self.state().mutation = MutationState::Committed;
    }

    fn fail(&self, context: &str, err: SyncError) -> TrackerError {
        let mut state = self.state();
        state.mutation = MutationState::Rejected(err.to_string());
        state.notices.report(context, &err);
        err.into()
    }
}

/// One folder's categories, unclassified documents and progress.
pub struct FolderDetailView {
    shared: Arc<Shared>,
    poll_interval: Duration,
    poller: Mutex<Option<PollerHandle>>,
}

impl FolderDetailView {
    /// View over `folder_id`; nothing is fetched until [`Self::mount`].
    #[must_use]
    pub fn new(
        remote: Arc<dyn RemoteSync>,
        markers: SharedMarkerStore,
        folder_id: FolderId,
    ) -> Self {
        let observer = MarkerObserver::synced_with(markers.as_ref());
        Self {
            shared: Arc::new(Shared {
                remote,
                markers,
                folder_id,
                state: Mutex::new(FolderDetailState::default()),
                observer: Mutex::new(observer),
                epoch: RequestEpoch::new(),
                ticks: AtomicU32::new(0),
            }),
            poll_interval: DEFAULT_POLL_INTERVAL,
            poller: Mutex::new(None),
        }
    }

    /// Resume waiting on a trigger sent earlier, e.g. by another process.
    #[must_use]
    pub fn with_pending_classification(self, pending: Option<PendingClassification>) -> Self {
        self.shared.state().pending_classification = pending;
        self
    }

    /// Override the polling interval; `Duration::ZERO` disables polling.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Folder this view shows.
    #[must_use]
    pub fn folder_id(&self) -> FolderId {
        self.shared.folder_id
    }

    /// Copy of the current view state.
    #[must_use]
    pub fn snapshot(&self) -> FolderDetailState {
        self.shared.state().clone()
    }

    /// Remove and return pending notices.
    pub fn take_notices(&self) -> Vec<Notice> {
        self.shared.state().notices.drain()
    }

    /// Whether the poller is running.
    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.poller()
            .as_ref()
            .is_some_and(|poller| !poller.is_cancelled() && !poller.is_finished())
    }

    fn poller(&self) -> MutexGuard<'_, Option<PollerHandle>> {
        self.poller.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch everything and start polling progress.
    ///
    /// Polling starts even when the initial fetch fails, unless the session
    /// was rejected.
    ///
    /// # Errors
    /// Returns the first failed fetch.
    pub async fn mount(&self) -> TrackerResult<()> {
        *self.shared.observer() = MarkerObserver::synced_with(self.shared.markers.as_ref());
        let result = self.shared.refresh_all().await;
        let session_rejected = result
            .as_ref()
            .err()
            .is_some_and(|err| err.session_failure().is_some());
        let mut poller = self.poller();
        if poller.is_none() && !self.poll_interval.is_zero() && !session_rejected {
            let shared = Arc::clone(&self.shared);
            *poller = Some(spawn_poller(self.poll_interval, move || {
                let shared = Arc::clone(&shared);
                async move { shared.poll_once().await }
            }));
        }
        drop(poller);
        result
    }

    /// Stop polling and ignore every response still in flight.
    pub fn unmount(&self) {
        self.shared.epoch.advance();
        if let Some(poller) = self.poller().take() {
            poller.cancel();
        }
    }

    /// Re-fetch categories, unclassified documents, progress and the open
    /// category.
    ///
    /// # Errors
    /// Returns the first failed fetch; other lists are still updated.
    pub async fn refresh_all(&self) -> TrackerResult<()> {
        self.shared.refresh_all().await
    }

    /// Fetch progress once (what the poller does on each tick).
    ///
    /// # Errors
    /// Returns the backend failure; the previous snapshot is kept.
    pub async fn refresh_progress(&self) -> TrackerResult<Option<ProgressSnapshot>> {
        self.shared.fetch_progress().await?;
        Ok(self.shared.state().progress)
    }

    /// Re-fetch when another view published a change since the last look.
    /// Returns whether a fetch happened.
    ///
    /// # Errors
    /// Returns the backend failure; the marker stays unacknowledged.
    pub async fn on_focus(&self) -> TrackerResult<bool> {
        let pending = self.shared.observer().check(self.shared.markers.as_ref());
        let Some(marker) = pending else {
            return Ok(false);
        };
        self.shared.refresh_all().await?;
        self.shared.observer().acknowledge(marker);
        Ok(true)
    }

    /// Show the documents of `name`.
    ///
    /// # Errors
    /// Returns the backend failure.
    pub async fn open_category(&self, name: &str) -> TrackerResult<Vec<Document>> {
        {
            let mut state = self.shared.state();
            if state.open_category.as_ref().is_none_or(|open| open.name != name) {
                state.open_category = Some(OpenCategory {
                    name: name.to_string(),
                    documents: Vec::new(),
                });
            }
        }
        self.shared.fetch_open_category().await?;
        Ok(self
            .shared
            .state()
            .open_category
            .as_ref()
            .filter(|open| open.name == name)
            .map(|open| open.documents.clone())
            .unwrap_or_default())
    }

    /// Stop browsing the open category.
    pub fn close_category(&self) {
        self.shared.state().open_category = None;
    }

    /// Expand or collapse the unclassified section.
    pub fn set_unclassified_expanded(&self, expanded: bool) {
        self.shared.state().unclassified_expanded = expanded;
    }

    /// Create a category named by `dialog`.
    ///
    /// # Errors
    /// Validation and conflict failures keep the dialog open with the message.
    pub async fn create_category(&self, dialog: &mut NameDialog) -> TrackerResult<()> {
        let name = self.begin_naming(dialog)?;
        let folder_id = self.shared.folder_id;
        match self.shared.remote.create_category(folder_id, &name).await {
            Ok(()) => {
                dialog.commit();
                {
                    let mut state = self.shared.state();
                    state.mutation = MutationState::Committed;
                    state.categories.insert(
                        0,
                        Category {
                            name: name.clone(),
                            folder_id,
                            updated_at: None,
                        },
                    );
                }
                info!(folder_id, category = %name, "category created");
                self.shared.publish();
                let _ = self.shared.fetch_categories().await;
                Ok(())
            }
            Err(err) => Err(self.reject_naming(dialog, "failed to create category", err)),
        }
    }

    /// Rename the category a rename dialog was opened for.
    ///
    /// # Errors
    /// Validation and conflict failures keep the dialog open with the message.
    pub async fn rename_category(&self, dialog: &mut NameDialog) -> TrackerResult<()> {
        let Some(old_name) = dialog.current_name().map(ToString::to_string) else {
            let err = SyncError::validation("a rename dialog is required");
            dialog.reject(&err);
            return Err(err.into());
        };
        let new_name = self.begin_naming(dialog)?;
        let folder_id = self.shared.folder_id;
        match self
            .shared
            .remote
            .rename_category(folder_id, &old_name, &new_name)
            .await
        {
            Ok(()) => {
                dialog.commit();
                {
                    let mut state = self.shared.state();
                    state.mutation = MutationState::Committed;
                    for category in state.categories.iter_mut().filter(|c| c.name == old_name) {
                        category.name.clone_from(&new_name);
                    }
                    if let Some(open) = state.open_category.as_mut().filter(|o| o.name == old_name) {
                        open.name.clone_from(&new_name);
                    }
                }
                info!(folder_id, from = %old_name, to = %new_name, "category renamed");
                self.shared.publish();
                let _ = tokio::join!(
                    self.shared.fetch_categories(),
                    self.shared.fetch_open_category()
                );
                Ok(())
            }
            Err(err) => Err(self.reject_naming(dialog, "failed to rename category", err)),
        }
    }

    /// First step of deleting a category.
    ///
    /// # Errors
    /// Returns [`SyncError::NotFound`] when the category is not shown.
    pub fn request_delete_category(&self, name: &str) -> TrackerResult<Confirmation> {
        let state = self.shared.state();
        if !state.categories.iter().any(|category| category.name == name) {
            return Err(SyncError::NotFound {
                message: format!("category '{name}' is not in this folder"),
            }
            .into());
        }
        Ok(Confirmation::new(PendingDeletion::Category {
            folder_id: self.shared.folder_id,
            name: name.to_string(),
        }))
    }

    /// Delete a confirmed category.
    ///
    /// Its documents become unclassified: the unclassified list is re-fetched
    /// and expanded so they stay visible. A category that is already gone
    /// counts as deleted.
    ///
    /// # Errors
    /// Returns [`TrackerError::ConfirmationMismatch`] or the backend failure.
    pub async fn delete_category(&self, confirmation: Confirmation) -> TrackerResult<()> {
        let name = match confirmation.target() {
            PendingDeletion::Category { folder_id, name } if *folder_id == self.shared.folder_id => {
                name.clone()
            }
            _ => return Err(TrackerError::ConfirmationMismatch),
        };
        let folder_id = self.shared.folder_id;
        self.shared.begin();
        match self.shared.remote.delete_category(folder_id, &name).await {
            Ok(()) => {}
            Err(err) if err.is_not_found() => {
                debug!(folder_id, category = %name, "category already deleted");
            }
            Err(err) => return Err(self.shared.fail("failed to delete category", err)),
        }
        {
            let mut state = self.shared.state();
            state.categories.retain(|category| category.name != name);
            if state.open_category.as_ref().is_some_and(|open| open.name == name) {
                state.open_category = None;
            }
            state.unclassified_expanded = true;
            state.mutation = MutationState::Committed;
        }
        info!(folder_id, category = %name, "category deleted");
        self.shared.publish();
        let _ = tokio::join!(
            self.shared.fetch_unclassified(),
            self.shared.fetch_progress()
        );
        Ok(())
    }

    /// First step of deleting a document.
    pub fn request_delete_file(&self, file_id: FileId) -> Confirmation {
        let name = self
            .shared
            .state()
            .find_document(file_id)
            .map_or_else(|| format!("document {file_id}"), |doc| doc.name().to_string());
        Confirmation::new(PendingDeletion::File {
            folder_id: self.shared.folder_id,
            file_id,
            name,
        })
    }

    /// Delete a confirmed document. A document that is already gone counts as
    /// deleted.
    ///
    /// # Errors
    /// Returns [`TrackerError::ConfirmationMismatch`] or the backend failure.
    pub async fn delete_file(&self, confirmation: Confirmation) -> TrackerResult<()> {
        let file_id = match confirmation.target() {
            PendingDeletion::File {
                folder_id, file_id, ..
            } if *folder_id == self.shared.folder_id => *file_id,
            _ => return Err(TrackerError::ConfirmationMismatch),
        };
        self.shared.begin();
        match self.shared.remote.delete_file(file_id).await {
            Ok(()) => {}
            Err(err) if err.is_not_found() => debug!(file_id, "document already deleted"),
            Err(err) => return Err(self.shared.fail("failed to delete document", err)),
        }
        {
            let mut state = self.shared.state();
            state.unclassified.retain(|doc| doc.id() != file_id);
            if let Some(open) = state.open_category.as_mut() {
                open.documents.retain(|doc| doc.id() != file_id);
            }
            state.mutation = MutationState::Committed;
        }
        info!(folder_id = self.shared.folder_id, file_id, "document deleted");
        self.shared.publish();
        let _ = self.shared.fetch_progress().await;
        Ok(())
    }

    /// Decompress an archive document into new documents.
    ///
    /// # Errors
    /// Returns a validation failure for a document known not to be an
    /// unexpanded archive, or the backend failure.
    pub async fn expand_archive(&self, file_id: FileId) -> TrackerResult<ExpandOutcome> {
        let known = self
            .shared
            .state()
            .find_document(file_id)
            .map(|doc| (doc.file_type().is_archive(), doc.is_expanded()));
        match known {
            Some((false, _)) => {
                return Err(self
                    .shared
                    .fail("cannot expand", SyncError::validation("only ZIP archives can be expanded")));
            }
            Some((true, true)) => {
                return Err(self
                    .shared
                    .fail("cannot expand", SyncError::validation("archive has already been expanded")));
            }
            _ => {}
        }
        let folder_id = self.shared.folder_id;
        self.shared.begin();
        let outcome = match self.shared.remote.expand_archive(folder_id, file_id).await {
            Ok(outcome) => outcome,
            Err(err) => return Err(self.shared.fail("failed to expand archive", err)),
        };
        {
            let mut state = self.shared.state();
            state.mutation = MutationState::Committed;
            state.notices.push(Notice::info(outcome.message.clone()));
        }
        info!(folder_id, file_id, extracted = ?outcome.extracted, "archive expanded");
        self.shared.publish();
        let _ = tokio::join!(
            self.shared.fetch_unclassified(),
            self.shared.fetch_progress()
        );
        Ok(outcome)
    }

    /// Ask the backend to classify every waiting document.
    ///
    /// Nothing is sent while an earlier request is unsettled: resubmitting
    /// would queue the same documents twice.
    ///
    /// # Errors
    /// Returns the backend failure. The trigger is never retried automatically.
    pub async fn request_classification(&self) -> TrackerResult<ClassificationOutcome> {
        self.trigger_classification(TriggerKind::Waiting).await
    }

    /// Re-queue documents whose classification failed.
    ///
    /// # Errors
    /// Returns the backend failure. The trigger is never retried automatically.
    pub async fn retry_failed_classification(&self) -> TrackerResult<ClassificationOutcome> {
        self.trigger_classification(TriggerKind::Failed).await
    }

    async fn trigger_classification(&self, kind: TriggerKind) -> TrackerResult<ClassificationOutcome> {
        // De-duplication needs the current counts.
        if self.shared.state().progress.is_none() {
            self.shared.fetch_progress().await?;
        }
        let baseline = match self.claim_classification(kind) {
            Ok(baseline) => baseline,
            Err(outcome) => return Ok(outcome),
        };
        let folder_id = self.shared.folder_id;
        let result = match kind {
            TriggerKind::Waiting => self.shared.remote.request_classification(folder_id).await,
            TriggerKind::Failed => {
                self.shared
                    .remote
                    .retry_failed_classification(folder_id)
                    .await
            }
        };
        self.finish_classification(kind, &baseline, result).await
    }

    fn claim_classification(
        &self,
        kind: TriggerKind,
    ) -> Result<ProgressSnapshot, ClassificationOutcome> {
        let mut state = self.shared.state();
        let baseline = state.progress.unwrap_or_default();
        if kind == TriggerKind::Failed && baseline.classification_failed == 0 {
            return Err(ClassificationOutcome::NothingFailed);
        }
        if state.classification_unsettled() {
            debug!(
                folder_id = self.shared.folder_id,
                ?kind,
                "classification already queued"
            );
            return Err(ClassificationOutcome::AlreadyQueued);
        }
        state.classification_in_flight = true;
        state.mutation = MutationState::Submitting;
        Ok(baseline)
    }

    async fn finish_classification(
        &self,
        kind: TriggerKind,
        baseline: &ProgressSnapshot,
        result: SyncResult<()>,
    ) -> TrackerResult<ClassificationOutcome> {
        let message = match kind {
            TriggerKind::Waiting => "classification requested",
            TriggerKind::Failed => "retry of failed documents requested",
        };
        {
            let mut state = self.shared.state();
            state.classification_in_flight = false;
            match &result {
                Ok(()) => {
                    state.pending_classification =
                        PendingClassification::new(kind, baseline, Utc::now());
                    state.mutation = MutationState::Committed;
                    state.notices.push(Notice::info(message));
                }
                Err(err) => {
                    state.mutation = MutationState::Rejected(err.to_string());
                    state.notices.report("failed to request classification", err);
                }
            }
        }
        result?;
        info!(folder_id = self.shared.folder_id, "{message}");
        let _ = self.shared.fetch_progress().await;
        Ok(ClassificationOutcome::Queued)
    }

    /// Upload local files into this folder. Returns how many were accepted.
    ///
    /// # Errors
    /// Returns the backend failure.
    pub async fn upload_files(&self, files: Vec<UploadFile>) -> TrackerResult<u64> {
        let folder_id = self.shared.folder_id;
        self.shared.begin();
        let uploaded = match self.shared.remote.upload_files(folder_id, files).await {
            Ok(uploaded) => uploaded,
            Err(err) => return Err(self.shared.fail("failed to upload documents", err)),
        };
        {
            let mut state = self.shared.state();
            state.mutation = MutationState::Committed;
            state
                .notices
                .push(Notice::info(format!("{uploaded} document(s) uploaded")));
        }
        info!(folder_id, uploaded, "documents uploaded");
        self.shared.publish();
        let _ = tokio::join!(
            self.shared.fetch_unclassified(),
            self.shared.fetch_progress()
        );
        Ok(uploaded)
    }

    /// Download the whole folder as an archive.
    ///
    /// # Errors
    /// Returns the backend or file-system failure.
    pub async fn download_folder(&self, sink: &DownloadSink) -> TrackerResult<PathBuf> {
        let folder_id = self.shared.folder_id;
        let payload = self.shared.remote.download_folder(folder_id).await;
        self.store(payload, sink, &format!("folder-{folder_id}.zip"))
            .await
    }

    /// Download one category as an archive.
    ///
    /// # Errors
    /// Returns the backend or file-system failure.
    pub async fn download_category(
        &self,
        name: &str,
        sink: &DownloadSink,
    ) -> TrackerResult<PathBuf> {
        let payload = self
            .shared
            .remote
            .download_category(self.shared.folder_id, name)
            .await;
        self.store(payload, sink, &format!("{name}.zip")).await
    }

    /// Download a single document.
    ///
    /// # Errors
    /// Returns the backend or file-system failure.
    pub async fn download_file(&self, file_id: FileId, sink: &DownloadSink) -> TrackerResult<PathBuf> {
        let fallback = self
            .shared
            .state()
            .find_document(file_id)
            .map_or_else(|| format!("document-{file_id}"), |doc| doc.name().to_string());
        let payload = self.shared.remote.download_file(file_id).await;
        self.store(payload, sink, &fallback).await
    }

    async fn store(
        &self,
        payload: SyncResult<DownloadPayload>,
        sink: &DownloadSink,
        fallback: &str,
    ) -> TrackerResult<PathBuf> {
        let payload = match payload {
            Ok(payload) => payload,
            Err(err) => {
                self.shared.state().notices.report("download failed", &err);
                return Err(err.into());
            }
        };
        match sink.store(payload, fallback).await {
            Ok(path) => {
                self.shared
                    .state()
                    .notices
                    .push(Notice::info(format!("saved {}", path.display())));
                Ok(path)
            }
            Err(err) => {
                warn!(error = %err, "download could not be saved");
                self.shared.state().notices.push(Notice {
                    kind: NoticeKind::Error,
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    fn begin_naming(&self, dialog: &mut NameDialog) -> TrackerResult<String> {
        match dialog.begin_submit() {
            Ok(name) => {
                self.shared.begin();
                Ok(name)
            }
            Err(err) => {
                self.shared.state().mutation = MutationState::Rejected(err.to_string());
                Err(err.into())
            }
        }
    }

    fn reject_naming(&self, dialog: &mut NameDialog, context: &str, err: SyncError) -> TrackerError {
        dialog.reject(&err);
        if matches!(err, SyncError::Conflict { .. }) {
            warn!(folder_id = self.shared.folder_id, context, error = %err, "name rejected");
            self.shared.state().mutation = MutationState::Rejected(err.to_string());
            err.into()
        } else {
            self.shared.fail(context, err)
        }
    }
}

impl Drop for FolderDetailView {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(waiting: u64, pending: u64, done: u64) -> ProgressSnapshot {
        ProgressSnapshot {
            total: waiting + pending + done,
            transform_done: waiting + pending + done,
            classification_waiting: waiting,
            classification_pending: pending,
            classification_done: done,
            ..ProgressSnapshot::default()
        }
    }

    fn requested(baseline: &ProgressSnapshot) -> FolderDetailState {
        FolderDetailState {
            progress: Some(*baseline),
            pending_classification: PendingClassification::new(
                TriggerKind::Waiting,
                baseline,
                Utc::now(),
            ),
            ..FolderDetailState::default()
        }
    }

    #[test]
    fn settling_after_a_pickup_counts_as_completion() {
        let mut state = requested(&snapshot(1, 0, 0));
        let running = apply_progress(&mut state, snapshot(0, 1, 0), Utc::now());
        assert!(running.changed);
        assert!(!running.classification_completed);
        assert!(state.pending_classification.is_some());

        let done = apply_progress(&mut state, snapshot(0, 0, 1), Utc::now());
        assert!(done.classification_completed);
        assert!(state.pending_classification.is_none());
    }

    #[test]
    fn unstarted_request_is_not_completion() {
        let mut state = requested(&snapshot(2, 0, 0));
        let change = apply_progress(&mut state, snapshot(2, 0, 0), Utc::now());
        assert!(!change.classification_completed);
        assert!(state.classification_unsettled());
    }

    #[test]
    fn stale_request_expires_and_unblocks_new_triggers() {
        let mut state = requested(&snapshot(1, 0, 0));
        let later = Utc::now() + chrono::TimeDelta::hours(1);
        let change = apply_progress(&mut state, snapshot(1, 0, 0), later);
        assert!(change.pickup_expired);
        assert!(!change.classification_completed);
        assert!(!state.classification_unsettled());
    }

    #[test]
    fn identical_snapshots_are_not_changes() {
        let mut state = FolderDetailState::default();
        let first = apply_progress(&mut state, snapshot(0, 2, 0), Utc::now());
        assert!(first.changed);
        assert!(!first.classification_completed);

        let second = apply_progress(&mut state, snapshot(0, 2, 0), Utc::now());
        assert!(!second.changed);

        let settled = apply_progress(&mut state, snapshot(0, 0, 2), Utc::now());
        assert!(settled.classification_completed);
    }

    #[test]
    fn pending_work_blocks_new_requests() {
        let state = FolderDetailState {
            progress: Some(snapshot(0, 1, 0)),
            ..FolderDetailState::default()
        };
        assert!(state.classification_unsettled());
        assert!(!FolderDetailState::default().classification_unsettled());
    }
}
