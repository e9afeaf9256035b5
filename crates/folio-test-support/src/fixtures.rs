//! Canned backend states.

use folio_core::{ClassificationState, FileId, FolderId, TransformState, UserId};

use crate::backend::{InMemoryBackend, SeedDocument};

/// User every fixture signs in as.
pub const FIXTURE_USER: UserId = 1;

/// Handles into the "Reports" fixture.
#[derive(Debug, Clone, Copy)]
pub struct ReportsFixture {
    /// The "Reports" folder.
    pub folder: FolderId,
    /// Unclassified "a.pdf", extracted and waiting for classification.
    pub pending_pdf: FileId,
}

/// Folder "Reports" with category "Invoices" and one unclassified `a.pdf`
/// whose text has been extracted.
#[must_use]
pub fn reports_fixture() -> (InMemoryBackend, ReportsFixture) {
    let backend = InMemoryBackend::new(FIXTURE_USER);
    let folder = backend.seed_folder("Reports");
    backend.seed_category(folder, "Invoices");
    let pending_pdf = backend.seed_document(
        folder,
        SeedDocument::new("a.pdf")
            .transform(TransformState::Done)
            .classification(ClassificationState::Pending),
    );
    (backend, ReportsFixture { folder, pending_pdf })
}

/// Folder with one category holding two classified documents plus one
/// unclassified document.
#[must_use]
pub fn populated_category_fixture() -> (InMemoryBackend, FolderId) {
    let backend = InMemoryBackend::new(FIXTURE_USER);
    let folder = backend.seed_folder("Reports");
    backend.seed_category(folder, "Invoices");
    backend.seed_category(folder, "Contracts");
    backend.seed_document(folder, SeedDocument::new("f1.pdf").classified("Invoices"));
    backend.seed_document(folder, SeedDocument::new("f2.docx").classified("Invoices"));
    backend.seed_document(folder, SeedDocument::new("loose.txt"));
    (backend, folder)
}
