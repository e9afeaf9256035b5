//! Dirty-marker stores.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use tracing::debug;

use crate::error::MarkerResult;
use crate::file::LockedJsonFile;

/// Monotonic "something changed" value.
pub type Marker = u64;

/// Key used when a store tracks folder-level facts.
pub const DEFAULT_KEY: &str = "folders";
/// File name of the persisted marker map inside the state directory.
pub const MARKER_FILE: &str = "markers.json";

/// Next marker after `previous`: strictly greater, and close to wall-clock
/// milliseconds so separate processes order roughly by time.
#[must_use]
pub fn next_marker(previous: Marker) -> Marker {
    let now = Marker::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
    previous.saturating_add(1).max(now)
}

/// Shared persisted marker.
///
/// Readers only ask whether a value is newer than the one they last saw.
pub trait DirtyMarkerStore: Send + Sync {
    /// Latest published marker, `0` when nothing was ever published.
    fn current(&self) -> Marker;

    /// Publish a new marker and return it.
    ///
    /// # Errors
    /// Returns [`MarkerError`] when the marker cannot be persisted.
    fn publish(&self) -> MarkerResult<Marker>;
}

/// Process-local marker store.
#[derive(Debug, Default)]
pub struct MemoryMarkerStore {
    value: AtomicU64,
}

impl MemoryMarkerStore {
    /// Empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            value: AtomicU64::new(0),
        }
    }
}

impl DirtyMarkerStore for MemoryMarkerStore {
    fn current(&self) -> Marker {
        self.value.load(Ordering::Acquire)
    }

    fn publish(&self) -> MarkerResult<Marker> {
        let mut published = 0;
        let _ = self
            .value
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |previous| {
                published = next_marker(previous);
                Some(published)
            });
        Ok(published)
    }
}

/// Marker store persisted as a JSON map in the state directory.
///
/// Several processes (CLI invocations, long-running watchers) share the file;
/// publishing holds the file's cross-process lock so the stored marker never
/// moves backwards. Unreadable or corrupt contents count as marker `0`.
#[derive(Debug, Clone)]
pub struct FileMarkerStore {
    file: LockedJsonFile,
    key: String,
}

impl FileMarkerStore {
    /// Store for `key` inside `state_dir`.
    #[must_use]
    pub fn new(state_dir: impl AsRef<Path>, key: impl Into<String>) -> Self {
        Self {
            file: LockedJsonFile::new(state_dir.as_ref().join(MARKER_FILE)),
            key: key.into(),
        }
    }

    /// Store for [`DEFAULT_KEY`].
    #[must_use]
    pub fn for_folders(state_dir: impl AsRef<Path>) -> Self {
        Self::new(state_dir, DEFAULT_KEY)
    }

    /// Location of the marker file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

impl DirtyMarkerStore for FileMarkerStore {
    fn current(&self) -> Marker {
        self.file
            .read::<BTreeMap<String, Marker>>()
            .get(&self.key)
            .copied()
            .unwrap_or(0)
    }

    fn publish(&self) -> MarkerResult<Marker> {
        let next = self.file.update(|map: &mut BTreeMap<String, Marker>| {
            let next = next_marker(map.get(&self.key).copied().unwrap_or(0));
            map.insert(self.key.clone(), next);
            next
        })?;
        debug!(key = %self.key, marker = next, "dirty marker published");
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn next_marker_is_strictly_increasing() {
        let far_future = Marker::MAX - 1;
        assert_eq!(next_marker(far_future), Marker::MAX);
        assert_eq!(next_marker(Marker::MAX), Marker::MAX);
        assert!(next_marker(0) > 0);
    }

    #[test]
    fn memory_store_publishes_monotonic_markers() {
        let store = MemoryMarkerStore::new();
        assert_eq!(store.current(), 0);
        let first = store.publish().expect("publish");
        let second = store.publish().expect("publish");
        assert!(second > first);
        assert_eq!(store.current(), second);
    }

    #[test]
    fn concurrent_publishers_never_reuse_a_marker() {
        let store = Arc::new(MemoryMarkerStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    (0..50)
                        .map(|_| store.publish().expect("publish"))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let mut all: Vec<Marker> = handles
            .into_iter()
            .flat_map(|handle| handle.join().expect("thread"))
            .collect();
        let total = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), total);
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().expect("tempdir");
        let writer = FileMarkerStore::for_folders(dir.path());
        assert_eq!(writer.current(), 0);
        let published = writer.publish().expect("publish");

        let reader = FileMarkerStore::for_folders(dir.path());
        assert_eq!(reader.current(), published);

        let other_key = FileMarkerStore::new(dir.path(), "uploads");
        assert_eq!(other_key.current(), 0);
        other_key.publish().expect("publish");
        assert_eq!(reader.current(), published);
    }

    #[test]
    fn racing_stores_never_move_the_marker_backwards() {
        let dir = tempfile::tempdir().expect("tempdir");
        let handles: Vec<_> = (0..6)
            .map(|_| {
                let state_dir = dir.path().to_path_buf();
                thread::spawn(move || {
                    // A fresh store per thread shares nothing in memory.
                    let store = FileMarkerStore::for_folders(state_dir);
                    (0..20)
                        .map(|_| store.publish().expect("publish"))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let mut all: Vec<Marker> = handles
            .into_iter()
            .flat_map(|handle| handle.join().expect("thread"))
            .collect();
        let total = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), total);

        let latest = FileMarkerStore::for_folders(dir.path()).current();
        assert_eq!(Some(&latest), all.last());
    }

    #[test]
    fn corrupt_file_reads_as_zero_and_is_repaired() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileMarkerStore::for_folders(dir.path());
        std::fs::write(store.path(), b"{not json").expect("write");
        assert_eq!(store.current(), 0);

        let published = store.publish().expect("publish");
        assert!(published > 0);
        assert_eq!(store.current(), published);
    }

    #[test]
    fn file_store_creates_missing_state_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("state").join("folio");
        let store = FileMarkerStore::for_folders(&nested);
        store.publish().expect("publish");
        assert!(nested.join(MARKER_FILE).exists());
    }
}
