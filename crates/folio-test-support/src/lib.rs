#![forbid(unsafe_code)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Shared test helpers used across Folio suites.
//! Layout: backend.rs (in-memory `RemoteSync`), fixtures.rs (canned folder states).

pub mod backend;
pub mod fixtures;

pub use backend::{Classifier, InMemoryBackend, SeedDocument};
pub use fixtures::{FIXTURE_USER, ReportsFixture, populated_category_fixture, reports_fixture};
