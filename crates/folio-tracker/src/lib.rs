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

//! Client-side views over the Folio backend.
//!
//! Layout:
//! - `folder_list.rs`: the user's folders
//! - `folder_detail.rs`: categories, unclassified documents and progress of one folder
//! - `classification.rs`: trigger de-duplication and the on-disk ledger of outstanding triggers
//! - `mutation.rs`: name dialogs, mutation state and delete confirmations
//! - `poller.rs`: cancellable fixed-interval reconciliation loop
//! - `epoch.rs`: stale-response guard
//! - `notice.rs`: user-facing notices
//! - `download.rs`: atomic download persistence

pub mod classification;
pub mod download;
pub mod epoch;
pub mod error;
pub mod folder_detail;
pub mod folder_list;
pub mod mutation;
pub mod notice;
pub mod poller;

pub use classification::{
    ClassificationLedger, ClassificationOutcome, LEDGER_FILE, PICKUP_TIMEOUT, PendingClassification,
    PickupStatus, TriggerKind,
};
pub use download::{DownloadSink, sanitize_file_name};
pub use epoch::{RequestEpoch, Ticket};
pub use error::{TrackerError, TrackerResult};
pub use folder_detail::{FolderDetailState, FolderDetailView, LIST_REFRESH_TICKS, OpenCategory};
pub use folder_list::{FolderListState, FolderListView};
pub use mutation::{
    Confirmation, DialogPurpose, MAX_NAME_LEN, MutationState, NameDialog, PendingDeletion,
    validate_name,
};
pub use notice::{Notice, NoticeBoard, NoticeKind};
pub use poller::{DEFAULT_POLL_INTERVAL, PollerHandle, spawn_poller};
