//! Mutation state machine, name dialogs and destructive confirmations.
//!
//! # Design
//! - A mutation moves `Idle -> Submitting -> Committed | Rejected`.
//! - Name input is validated locally; invalid names never reach the backend.
//! - A conflict keeps the dialog open and shows the server's own message.
//! - Destructive actions require a [`Confirmation`] that only the owning view
//!   can issue and that is consumed by the delete call.

use folio_client::SyncError;
use folio_core::{FileId, FolderId};

/// Longest accepted folder or category name, in characters.
pub const MAX_NAME_LEN: usize = 100;

/// Progress of the latest mutation of a view or dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MutationState {
    /// Nothing submitted.
    #[default]
    Idle,
    /// Request in flight.
    Submitting,
    /// Backend accepted the change.
    Committed,
    /// Change refused; message shown in place.
    Rejected(String),
}

impl MutationState {
    /// Whether a request is in flight.
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting)
    }

    /// Message of a rejected mutation.
    #[must_use]
    pub fn rejection(&self) -> Option<&str> {
        match self {
            Self::Rejected(message) => Some(message),
            _ => None,
        }
    }
}

/// Trim and check a folder or category name.
///
/// # Errors
/// Returns [`SyncError::Validation`] for blank names and names longer than
/// [`MAX_NAME_LEN`] characters.
pub fn validate_name(raw: &str) -> Result<String, SyncError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(SyncError::validation("name must not be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(SyncError::validation(format!(
            "name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

/// Purpose of a name dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogPurpose {
    /// Creating a new folder or category.
    Create,
    /// Renaming the entry currently called `current`.
    Rename {
        /// Name before the rename.
        current: String,
    },
}

/// Create/rename modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameDialog {
    purpose: DialogPurpose,
    input: String,
    state: MutationState,
    open: bool,
}

impl NameDialog {
    /// Dialog for creating an entry.
    #[must_use]
    pub fn create(input: impl Into<String>) -> Self {
        Self {
            purpose: DialogPurpose::Create,
            input: input.into(),
            state: MutationState::Idle,
            open: true,
        }
    }

    /// Dialog for renaming `current`, pre-filled with the current name.
    #[must_use]
    pub fn rename(current: impl Into<String>) -> Self {
        let current = current.into();
        Self {
            input: current.clone(),
            purpose: DialogPurpose::Rename { current },
            state: MutationState::Idle,
            open: true,
        }
    }

    /// Replace the typed name.
    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    /// Typed name, untrimmed.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Purpose of this dialog.
    #[must_use]
    pub const fn purpose(&self) -> &DialogPurpose {
        &self.purpose
    }

    /// Name being renamed, for rename dialogs.
    #[must_use]
    pub fn current_name(&self) -> Option<&str> {
        match &self.purpose {
            DialogPurpose::Rename { current } => Some(current),
            DialogPurpose::Create => None,
        }
    }

    /// Submission state.
    #[must_use]
    pub const fn state(&self) -> &MutationState {
        &self.state
    }

    /// Whether the dialog is still shown.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Message shown under the input, if the last submission failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.state.rejection()
    }

    /// Validate the input and enter `Submitting`.
    ///
    /// # Errors
    /// Returns the validation failure; the dialog stays open with the message.
    pub fn begin_submit(&mut self) -> Result<String, SyncError> {
        match validate_name(&self.input) {
            Ok(name) => {
                self.state = MutationState::Submitting;
                Ok(name)
            }
            Err(err) => {
                self.state = MutationState::Rejected(err.to_string());
                Err(err)
            }
        }
    }

    /// Backend accepted the name; the dialog closes.
    pub fn commit(&mut self) {
        self.state = MutationState::Committed;
        self.open = false;
    }

    /// Backend refused the name; the dialog stays open with the message.
    pub fn reject(&mut self, err: &SyncError) {
        self.state = MutationState::Rejected(err.to_string());
    }
}

/// Target of a destructive action awaiting confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingDeletion {
    /// Folder and everything beneath it.
    Folder {
        /// Folder to delete.
        folder_id: FolderId,
        /// Display name.
        name: String,
    },
    /// Category; its documents become unclassified.
    Category {
        /// Owning folder.
        folder_id: FolderId,
        /// Category name.
        name: String,
    },
    /// Single document.
    File {
        /// Owning folder.
        folder_id: FolderId,
        /// Document to delete.
        file_id: FileId,
        /// Display name.
        name: String,
    },
}

/// Proof that the user confirmed a destructive action.
///
/// Issued only by `request_delete_*` and consumed by the matching delete.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a confirmation does nothing until passed to the delete call"]
pub struct Confirmation {
    target: PendingDeletion,
}

impl Confirmation {
    pub(crate) const fn new(target: PendingDeletion) -> Self {
        Self { target }
    }

    /// What will be deleted.
    #[must_use]
    pub const fn target(&self) -> &PendingDeletion {
        &self.target
    }

    /// Question to show before proceeding.
    #[must_use]
    pub fn prompt(&self) -> String {
        match &self.target {
            PendingDeletion::Folder { name, .. } => format!(
                "Delete folder '{name}' with all of its categories and documents? This cannot be undone."
            ),
            PendingDeletion::Category { name, .. } => format!(
                "Delete category '{name}'? Its documents will move to the unclassified list."
            ),
            PendingDeletion::File { name, .. } => format!("Delete document '{name}'?"),
        }
    }
}
