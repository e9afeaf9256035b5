//! Folder list view.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::{debug, info, warn};

use folio_api_models::Folder;
use folio_client::{RemoteSync, SyncError};
use folio_core::{FolderId, UserId};
use folio_events::{MarkerObserver, SharedMarkerStore};

use crate::epoch::RequestEpoch;
use crate::error::{TrackerError, TrackerResult};
use crate::mutation::{Confirmation, MutationState, NameDialog, PendingDeletion};
use crate::notice::{Notice, NoticeBoard};

/// What the folder list shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderListState {
    /// Folders, most-recently-active first.
    pub folders: Vec<Folder>,
    /// Whether at least one fetch succeeded.
    pub loaded: bool,
    /// Latest mutation outcome.
    pub mutation: MutationState,
    /// Pending notices.
    pub notices: NoticeBoard,
}

/// Folders owned by one user.
pub struct FolderListView {
    remote: Arc<dyn RemoteSync>,
    markers: SharedMarkerStore,
    user_id: UserId,
    state: Mutex<FolderListState>,
    observer: Mutex<MarkerObserver>,
    epoch: RequestEpoch,
}

impl FolderListView {
    /// View over `user_id`'s folders; nothing is fetched until [`Self::refresh`].
    #[must_use]
    pub fn new(remote: Arc<dyn RemoteSync>, markers: SharedMarkerStore, user_id: UserId) -> Self {
        let observer = MarkerObserver::synced_with(markers.as_ref());
        Self {
            remote,
            markers,
            user_id,
            state: Mutex::new(FolderListState::default()),
            observer: Mutex::new(observer),
            epoch: RequestEpoch::new(),
        }
    }

    fn state(&self) -> MutexGuard<'_, FolderListState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn observer(&self) -> MutexGuard<'_, MarkerObserver> {
        self.observer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current view state.
    #[must_use]
    pub fn snapshot(&self) -> FolderListState {
        self.state().clone()
    }

    /// Folders currently shown.
    #[must_use]
    pub fn folders(&self) -> Vec<Folder> {
        self.state().folders.clone()
    }

    /// Remove and return pending notices.
    pub fn take_notices(&self) -> Vec<Notice> {
        self.state().notices.drain()
    }

    /// Replace the list with the server's.
    ///
    /// On failure the previous list stays in place and a notice is recorded.
    ///
    /// # Errors
    /// Returns the backend failure.
    pub async fn refresh(&self) -> TrackerResult<()> {
        let ticket = self.epoch.ticket();
        let result = self.remote.list_folders(self.user_id).await;
        let mut state = self.state();
        if !self.epoch.is_current(ticket) {
            debug!(user_id = self.user_id, "discarding stale folder list");
            return Ok(());
        }
        match result {
            Ok(folders) => {
                state.folders = folders;
                state.loaded = true;
                Ok(())
            }
            Err(err) => {
                state.notices.report("failed to load folders", &err);
                Err(err.into())
            }
        }
    }

    /// Re-fetch when another view published a change since the last look.
    /// Returns whether a fetch happened.
    ///
    /// # Errors
    /// Returns the backend failure; the marker stays unacknowledged so the
    /// next focus retries.
    pub async fn on_focus(&self) -> TrackerResult<bool> {
        let pending = self.observer().check(self.markers.as_ref());
        let Some(marker) = pending else {
            return Ok(false);
        };
        self.refresh().await?;
        self.observer().acknowledge(marker);
        Ok(true)
    }

    /// Mark a folder as just opened and move it to the top.
    pub fn open_folder(&self, folder_id: FolderId) -> Option<Folder> {
        let mut state = self.state();
        let folder = state
            .folders
            .iter_mut()
            .find(|folder| folder.id == folder_id)?;
        folder.last_activity = Some(Utc::now());
        let opened = folder.clone();
        sort_by_recency(&mut state.folders);
        Some(opened)
    }

    /// Create a folder named by `dialog`.
    ///
    /// The new folder is shown at the top right away, then the list is
    /// replaced by the server's.
    ///
    /// # Errors
    /// Validation and conflict failures keep the dialog open with the message.
    pub async fn create_folder(&self, dialog: &mut NameDialog) -> TrackerResult<FolderId> {
        let name = self.begin(dialog)?;
        match self.remote.create_folder(self.user_id, &name).await {
            Ok(folder_id) => {
                dialog.commit();
                {
                    let mut state = self.state();
                    state.mutation = MutationState::Committed;
                    state.folders.insert(
                        0,
                        Folder {
                            id: folder_id,
                            name: name.clone(),
                            file_count: 0,
                            last_activity: Some(Utc::now()),
                        },
                    );
                }
                info!(folder_id, folder = %name, "folder created");
                self.after_mutation().await;
                Ok(folder_id)
            }
            Err(err) => Err(self.reject(dialog, "failed to create folder", err)),
        }
    }

    /// Rename `folder_id` to the name in `dialog`.
    ///
    /// # Errors
    /// A conflict keeps the dialog open and the list unchanged.
    pub async fn rename_folder(
        &self,
        folder_id: FolderId,
        dialog: &mut NameDialog,
    ) -> TrackerResult<()> {
        let name = self.begin(dialog)?;
        match self.remote.rename_folder(folder_id, &name).await {
            Ok(()) => {
                dialog.commit();
                self.state().mutation = MutationState::Committed;
                info!(folder_id, folder = %name, "folder renamed");
                self.after_mutation().await;
                Ok(())
            }
            Err(err) => Err(self.reject(dialog, "failed to rename folder", err)),
        }
    }

    /// First step of deleting a folder.
    ///
    /// # Errors
    /// Returns [`SyncError::NotFound`] when the folder is not in the list.
    pub fn request_delete_folder(&self, folder_id: FolderId) -> TrackerResult<Confirmation> {
        let state = self.state();
        let folder = state
            .folders
            .iter()
            .find(|folder| folder.id == folder_id)
            .ok_or_else(|| SyncError::NotFound {
                message: format!("folder {folder_id} is not in the list"),
            })?;
        Ok(Confirmation::new(PendingDeletion::Folder {
            folder_id,
            name: folder.name.clone(),
        }))
    }

    /// Delete a confirmed folder with everything beneath it.
    ///
    /// A folder that is already gone counts as deleted.
    ///
    /// # Errors
    /// Returns [`TrackerError::ConfirmationMismatch`] for a confirmation of
    /// another kind, or the backend failure.
    pub async fn delete_folder(&self, confirmation: Confirmation) -> TrackerResult<()> {
        let PendingDeletion::Folder { folder_id, name } = confirmation.target().clone() else {
            return Err(TrackerError::ConfirmationMismatch);
        };
        self.state().mutation = MutationState::Submitting;
        match self.remote.delete_folder(folder_id).await {
            Ok(()) => {}
            Err(err) if err.is_not_found() => {
                debug!(folder_id, "folder already deleted");
            }
            Err(err) => {
                let mut state = self.state();
                state.mutation = MutationState::Rejected(err.to_string());
                state.notices.report("failed to delete folder", &err);
                return Err(err.into());
            }
        }
        {
            let mut state = self.state();
            state.folders.retain(|folder| folder.id != folder_id);
            state.mutation = MutationState::Committed;
        }
        info!(folder_id, folder = %name, "folder deleted");
        self.after_mutation().await;
        Ok(())
    }

    fn begin(&self, dialog: &mut NameDialog) -> TrackerResult<String> {
        match dialog.begin_submit() {
            Ok(name) => {
                self.state().mutation = MutationState::Submitting;
                Ok(name)
            }
            Err(err) => {
                self.state().mutation = MutationState::Rejected(err.to_string());
                Err(err.into())
            }
        }
    }

    fn reject(&self, dialog: &mut NameDialog, context: &str, err: SyncError) -> TrackerError {
        dialog.reject(&err);
        let mut state = self.state();
        state.mutation = MutationState::Rejected(err.to_string());
        if matches!(err, SyncError::Conflict { .. }) {
            warn!(context, error = %err, "name rejected");
        } else {
            state.notices.report(context, &err);
        }
        err.into()
    }

    async fn after_mutation(&self) {
        if let Err(err) = self.markers.publish() {
            warn!(error = %err, "failed to publish dirty marker");
        }
        if let Err(err) = self.refresh().await {
            debug!(error = %err, "reconciling folder list failed");
        }
    }
}

fn sort_by_recency(folders: &mut [Folder]) {
    folders.sort_by(|left, right| right.last_activity.cmp(&left.last_activity));
}
