#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![cfg_attr(test, allow(deprecated))]
#![allow(clippy::redundant_pub_crate)]

//! Command-line client for browsing and curating Folio folders.
//!
//! Layout:
//! - `cli.rs`: argument parsing, configuration and command dispatch
//! - `commands/`: command handlers grouped by concern
//! - `client.rs`: shared context, errors and confirmation prompt
//! - `output.rs`: renderers and formatting helpers
//! - `main.rs`: thin entrypoint delegating to `run()`

pub(crate) mod cli;
pub(crate) mod client;
pub(crate) mod commands;
pub(crate) mod output;

pub use cli::run;
