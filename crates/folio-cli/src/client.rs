//! Shared context, error type and confirmation prompt for command handlers.

use std::fmt::{self, Display, Formatter};
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use folio_client::{Credentials, HttpOptions, HttpRemote, RemoteSync, RetryPolicy, SyncError};
use folio_config::{ConfigError, TrackerConfig};
use folio_core::{FolderId, UserId};
use folio_events::{FileMarkerStore, SharedMarkerStore};
use folio_tracker::{
    ClassificationLedger, Confirmation, FolderDetailView, FolderListView, TrackerError,
};

use crate::cli::OutputFormat;

/// CLI-level error type separating bad input, rejected sessions and
/// operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Session(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
            Self::Session(_) => 4,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) | Self::Session(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.display_message())
    }
}

impl std::error::Error for CliError {}

impl From<SyncError> for CliError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Validation { message } => Self::Validation(message),
            SyncError::Auth(failure) => Self::Session(failure.to_string()),
            other => Self::Failure(anyhow!(other)),
        }
    }
}

impl From<TrackerError> for CliError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::Remote(err) => err.into(),
            other => Self::Failure(anyhow!(other)),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Application context passed to command handlers.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub(crate) remote: Arc<dyn RemoteSync>,
    pub(crate) markers: SharedMarkerStore,
    pub(crate) ledger: ClassificationLedger,
    pub(crate) user_id: Option<UserId>,
    pub(crate) poll_interval: Duration,
    pub(crate) download_dir: PathBuf,
    pub(crate) output: OutputFormat,
}

impl AppContext {
    /// Wire the HTTP backend and the on-disk marker store from `config`.
    pub(crate) fn from_config(config: &TrackerConfig, output: OutputFormat) -> CliResult<Self> {
        let credentials = match (config.user_id, config.token.as_ref()) {
            (Some(user_id), Some(token)) => Some(Credentials {
                user_id,
                token: token.clone(),
            }),
            _ => None,
        };
        let options = HttpOptions {
            timeout: config.http_timeout,
            retry: RetryPolicy {
                attempts: config.retry_attempts,
                backoff: config.retry_backoff,
            },
        };
        let remote = HttpRemote::new(config.api_url.clone(), credentials, options)?;
        Ok(Self {
            remote: Arc::new(remote),
            markers: Arc::new(FileMarkerStore::for_folders(&config.state_dir)),
            ledger: ClassificationLedger::new(&config.state_dir),
            user_id: config.user_id,
            poll_interval: config.poll_interval,
            download_dir: config.download_dir.clone(),
            output,
        })
    }

    pub(crate) fn require_user(&self) -> CliResult<UserId> {
        self.user_id.ok_or_else(|| {
            CliError::validation("user id is required (pass --user-id or set FOLIO_USER_ID)")
        })
    }

    pub(crate) fn folder_list(&self) -> CliResult<FolderListView> {
        Ok(FolderListView::new(
            Arc::clone(&self.remote),
            Arc::clone(&self.markers),
            self.require_user()?,
        ))
    }

    /// One-shot view; commands never keep a poller running in the background.
    pub(crate) fn folder_view(&self, folder_id: FolderId) -> FolderDetailView {
        FolderDetailView::new(Arc::clone(&self.remote), Arc::clone(&self.markers), folder_id)
            .with_poll_interval(Duration::ZERO)
    }

    /// Folder view that resumes the classification trigger an earlier
    /// invocation left outstanding.
    pub(crate) fn tracked_folder_view(&self, folder_id: FolderId) -> FolderDetailView {
        self.folder_view(folder_id)
            .with_pending_classification(self.ledger.load(folder_id))
    }

    /// Persist whatever trigger `view` still has outstanding.
    pub(crate) fn remember_classification(&self, view: &FolderDetailView) -> CliResult<()> {
        self.ledger
            .store(view.folder_id(), view.snapshot().pending_classification)
            .map_err(CliError::from)
    }
}

/// Ask before a destructive action unless `assume_yes` is set.
pub(crate) fn confirm(confirmation: &Confirmation, assume_yes: bool) -> CliResult<()> {
    if assume_yes {
        return Ok(());
    }
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        return Err(CliError::validation(
            "refusing to delete without confirmation; pass --yes",
        ));
    }
    print!("{} [y/N] ", confirmation.prompt());
    io::stdout().flush().map_err(CliError::failure)?;
    let mut answer = String::new();
    stdin
        .lock()
        .read_line(&mut answer)
        .map_err(CliError::failure)?;
    if accepts(&answer) {
        Ok(())
    } else {
        Err(CliError::validation("aborted"))
    }
}

fn accepts(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
