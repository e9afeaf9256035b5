//! Transient notices shown next to a view.

use std::collections::VecDeque;

use folio_client::{AuthFailure, SyncError};
use tracing::warn;

const MAX_NOTICES: usize = 20;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Confirmation of a completed action.
    Info,
    /// Retryable failure (backend unreachable or overloaded).
    Transient,
    /// Failure the user has to act on.
    Error,
    /// Credential rejected; the consumer must sign in again.
    SessionExpired,
}

/// One toast-style message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub kind: NoticeKind,
    /// Text shown to the user.
    pub message: String,
}

impl Notice {
    /// Informational notice.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    /// Notice describing a failed backend call.
    #[must_use]
    pub fn from_error(context: &str, err: &SyncError) -> Self {
        let kind = match err {
            SyncError::Auth(_) => NoticeKind::SessionExpired,
            err if err.is_retryable() => NoticeKind::Transient,
            _ => NoticeKind::Error,
        };
        let message = match err {
            SyncError::Auth(failure) => failure.to_string(),
            SyncError::Conflict { message } | SyncError::Validation { message } => message.clone(),
            other => format!("{context}: {other}"),
        };
        Self { kind, message }
    }
}

/// Bounded list of notices; the oldest is dropped when full.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoticeBoard {
    notices: VecDeque<Notice>,
    session_failure: Option<AuthFailure>,
}

impl NoticeBoard {
    /// Add a notice.
    pub fn push(&mut self, notice: Notice) {
        if self.notices.len() == MAX_NOTICES {
            self.notices.pop_front();
        }
        self.notices.push_back(notice);
    }

    /// Log a failed call and add the matching notice.
    pub fn report(&mut self, context: &str, err: &SyncError) {
        warn!(context, error = %err, "backend call failed");
        if let SyncError::Auth(failure) = err {
            self.session_failure = Some(*failure);
        }
        self.push(Notice::from_error(context, err));
    }

    /// Current notices, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    /// Remove and return every notice.
    pub fn drain(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    /// Auth failure seen by this view, if any.
    #[must_use]
    pub const fn session_failure(&self) -> Option<AuthFailure> {
        self.session_failure
    }

    /// Number of pending notices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notices.len()
    }

    /// Whether no notice is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }
}
