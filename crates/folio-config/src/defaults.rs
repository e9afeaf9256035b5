//! Built-in defaults.

use std::path::PathBuf;
use std::time::Duration;

/// Backend used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";
/// Per-request timeout.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);
/// Progress polling interval while a folder is open.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
/// Attempts per idempotent call.
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
/// Base delay between retries.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(500);
/// Upper bound accepted for `retry_attempts`.
pub const MAX_RETRY_ATTEMPTS: u32 = 10;
/// Log level when neither config nor `RUST_LOG` sets one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Where the dirty-marker file lives.
#[must_use]
pub fn default_state_dir() -> PathBuf {
    dirs::data_local_dir().map_or_else(|| PathBuf::from(".folio"), |dir| dir.join("folio"))
}

/// Where downloads land.
#[must_use]
pub fn default_download_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}
