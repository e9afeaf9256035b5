#![forbid(unsafe_code)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! Cross-view invalidation for Folio.
//!
//! A mutation that changes folder-level facts publishes a monotonically
//! increasing marker; a view that regains focus compares the marker with the
//! last one it acted on and re-fetches when a newer one exists. Markers carry
//! no payload, and observing the same marker twice only costs a redundant
//! fetch.
//!
//! Layout:
//! - `store.rs`: marker stores (in-memory and file-backed)
//! - `observer.rs`: per-view last-seen marker
//! - `file.rs`: JSON state files updated under a cross-process lock
//! - `error.rs`: persistence errors

pub mod error;
pub mod file;
pub mod observer;
pub mod store;

use std::sync::Arc;

pub use error::{MarkerError, MarkerResult};
pub use file::LockedJsonFile;
pub use observer::MarkerObserver;
pub use store::{
    DEFAULT_KEY, DirtyMarkerStore, FileMarkerStore, MARKER_FILE, Marker, MemoryMarkerStore,
    next_marker,
};

/// Handle shared by every view of one process.
pub type SharedMarkerStore = Arc<dyn DirtyMarkerStore>;
