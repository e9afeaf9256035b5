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

//! Configuration for the Folio tracker.
//!
//! Layout: defaults.rs (built-in values), model.rs (`TrackerConfig`, `ConfigLayer`),
//! loader.rs (TOML files and `FOLIO_*` overrides), validate.rs, error.rs.

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigSources, config_path, load, load_with, read_layer};
pub use model::{ConfigLayer, TrackerConfig};
pub use validate::validate;
