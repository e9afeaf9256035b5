#![forbid(unsafe_code)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Document lifecycle model shared across the Folio workspace.
//!
//! Layout: `model.rs` (documents, stages, file types), `status.rs` (user-facing
//! status derivation), `progress.rs` (folder-level progress aggregation).
//! Nothing in this crate performs I/O.

pub mod model;
pub mod progress;
pub mod status;

pub use model::{
    ClassificationState, Document, FileId, FileType, FolderId, ModelError, TransformState, UserId,
};
pub use progress::{ProgressSnapshot, aggregate};
pub use status::{StatusLabel, derive_label};
