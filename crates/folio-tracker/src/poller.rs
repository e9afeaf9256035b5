//! Fixed-interval reconciliation loop.

use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Default polling interval while a folder is open.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Running poller. Dropping the handle cancels it.
#[derive(Debug)]
pub struct PollerHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Stop polling; the current tick, if any, finishes on its own.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Whether the loop has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Cancel and wait for the loop to exit.
    pub async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Spawn a loop that calls `tick` every `period`, starting one period from now.
///
/// Missed ticks are skipped rather than bunched. The loop ends when the handle
/// is cancelled or dropped, or when `tick` returns [`ControlFlow::Break`].
pub fn spawn_poller<F, Fut>(period: Duration, mut tick: F) -> PollerHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ControlFlow<()>> + Send + 'static,
{
    let token = CancellationToken::new();
    let cancelled = token.clone();
    let task = tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately; callers already hold fresh data.
        ticker.tick().await;
        loop {
            tokio::select! {
                () = cancelled.cancelled() => break,
                _ = ticker.tick() => {
                    let flow = tokio::select! {
                        () = cancelled.cancelled() => ControlFlow::Break(()),
                        flow = tick() => flow,
                    };
                    if flow.is_break() {
                        break;
                    }
                }
            }
        }
        debug!("poller stopped");
    });
    PollerHandle {
        token,
        task: Some(task),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(
        counter: &Arc<AtomicUsize>,
    ) -> impl FnMut() -> std::future::Ready<ControlFlow<()>> + Send + 'static {
        let counter = Arc::clone(counter);
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(ControlFlow::Continue(()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_on_the_interval() {
        let counter = Arc::new(AtomicUsize::new(0));
        let handle = spawn_poller(Duration::from_secs(3), counting(&counter));

        tokio::time::sleep(Duration::from_millis(2_900)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(6_200)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_stops_the_loop() {
        let counter = Arc::new(AtomicUsize::new(0));
        let handle = spawn_poller(Duration::from_secs(1), counting(&counter));
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        drop(handle);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn break_ends_the_loop() {
        let handle = spawn_poller(Duration::from_secs(1), || {
            std::future::ready(ControlFlow::Break(()))
        });
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(handle.is_finished());
        assert!(!handle.is_cancelled());
    }
}
