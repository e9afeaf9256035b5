//! Per-view marker tracking.

use crate::store::{DirtyMarkerStore, Marker};

/// Last marker a view has acted on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkerObserver {
    last_seen: Marker,
}

impl MarkerObserver {
    /// Observer that considers everything up to `marker` already seen.
    #[must_use]
    pub const fn starting_at(marker: Marker) -> Self {
        Self { last_seen: marker }
    }

    /// Observer that treats the store's current value as seen.
    ///
    /// Views call this after their initial fetch so they do not re-fetch for
    /// markers published before they loaded.
    #[must_use]
    pub fn synced_with(store: &dyn DirtyMarkerStore) -> Self {
        Self::starting_at(store.current())
    }

    /// Last acknowledged marker.
    #[must_use]
    pub const fn last_seen(&self) -> Marker {
        self.last_seen
    }

    /// Newer marker in `store`, if any.
    #[must_use]
    pub fn check(&self, store: &dyn DirtyMarkerStore) -> Option<Marker> {
        let current = store.current();
        (current > self.last_seen).then_some(current)
    }

    /// Record that the view re-fetched for `marker`. Never moves backwards.
    pub fn acknowledge(&mut self, marker: Marker) {
        self.last_seen = self.last_seen.max(marker);
    }
}
