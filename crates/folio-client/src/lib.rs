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

//! Typed client for the Folio document backend.
//!
//! Layout:
//! - `error.rs`: `SyncError` taxonomy and HTTP status classification
//! - `remote.rs`: the `RemoteSync` trait every backend capability goes through
//! - `http.rs`: reqwest-backed implementation
//! - `retry.rs`: bounded retry for idempotent calls

pub mod error;
pub mod http;
pub mod remote;
pub mod retry;

pub use error::{AuthFailure, Operation, SyncError, SyncResult};
pub use http::{Credentials, HttpOptions, HttpRemote};
pub use remote::{DownloadPayload, ExpandOutcome, RemoteSync, UploadFile};
pub use retry::RetryPolicy;
