//! Bounded retry for idempotent backend calls.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

use crate::error::{Operation, SyncResult};

/// Default number of attempts per call.
pub const DEFAULT_ATTEMPTS: u32 = 3;
/// Default delay before the first retry; later retries scale linearly.
pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(500);

/// Retry settings for transient failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one; `0` behaves like `1`.
    pub attempts: u32,
    /// Base delay between attempts.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no retry.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            attempts: 1,
            backoff: Duration::ZERO,
        }
    }

    /// Run `call` until it succeeds, fails permanently, or attempts run out.
    ///
    /// # Errors
    /// Returns the last error produced by `call`.
    pub async fn run<T, F, Fut>(&self, operation: Operation, mut call: F) -> SyncResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = SyncResult<T>>,
    {
        let attempts = self.attempts.max(1);
        let mut attempt = 1;
        loop {
            match call().await {
                Err(err) if err.is_retryable() && attempt < attempts => {
                    warn!(
                        operation = operation.as_str(),
                        attempt,
                        error = %err,
                        "transient backend failure; retrying"
                    );
                    sleep(self.backoff.saturating_mul(attempt)).await;
                    attempt += 1;
                }
                outcome => return outcome,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retries_transient_failures_until_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy {
            attempts: 3,
            backoff: Duration::ZERO,
        };
        let counter = calls.clone();
        let result = policy
            .run(Operation::Progress, || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(SyncError::transport(Operation::Progress, "connection reset"))
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;
        assert_eq!(result, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_failures_are_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result: SyncResult<()> = RetryPolicy::default()
            .run(Operation::CreateFolder, || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(SyncError::Conflict {
                        message: "exists".into(),
                    })
                }
            })
            .await;
        assert!(matches!(result, Err(SyncError::Conflict { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gives_up_after_last_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result: SyncResult<()> = RetryPolicy {
            attempts: 2,
            backoff: Duration::ZERO,
        }
        .run(Operation::ListFolders, || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(SyncError::transport(Operation::ListFolders, "refused"))
            }
        })
        .await;
        assert!(matches!(result, Err(SyncError::Transport { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
