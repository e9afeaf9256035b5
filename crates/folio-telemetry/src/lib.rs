#![forbid(unsafe_code)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Logging primitives shared across the Folio workspace.
//!
//! Layout: init.rs (subscriber installation, log format), context.rs (span helpers).

pub mod context;
pub mod init;

pub use context::{command_span, folder_span, record_folder};
pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, init_logging};
