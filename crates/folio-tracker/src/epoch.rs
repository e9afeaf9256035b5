//! Stale-response guard.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Ticket taken before a fetch; compared against the epoch on arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Counter advanced whenever in-flight responses must be ignored (unmount,
/// folder switch).
#[derive(Debug, Clone, Default)]
pub struct RequestEpoch {
    current: Arc<AtomicU64>,
}

impl RequestEpoch {
    /// Fresh epoch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticket for a request issued now.
    #[must_use]
    pub fn ticket(&self) -> Ticket {
        Ticket(self.current.load(Ordering::Acquire))
    }

    /// Whether a response for `ticket` may still be applied.
    #[must_use]
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.current.load(Ordering::Acquire) == ticket.0
    }

    /// Invalidate every outstanding ticket.
    pub fn advance(&self) {
        self.current.fetch_add(1, Ordering::AcqRel);
    }
}
