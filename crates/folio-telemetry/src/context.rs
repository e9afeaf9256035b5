//! Span helpers for command and view scopes.

use tracing::Span;

use crate::init::build_sha;

/// Root span for one CLI command or long-running watcher.
#[must_use]
pub fn command_span(command: &str, user_id: Option<i64>) -> Span {
    tracing::info_span!(
        "folio",
        command = %command,
        user_id = user_id.unwrap_or_default(),
        folder_id = tracing::field::Empty,
        build_sha = %build_sha()
    )
}

/// Record the folder a [`command_span`] is working on.
pub fn record_folder(span: &Span, folder_id: i64) {
    span.record("folder_id", folder_id);
}

/// Span for a mounted folder view; `folder_id` is recorded up front.
#[must_use]
pub fn folder_span(folder_id: i64) -> Span {
    tracing::info_span!("folder_view", folder_id)
}
