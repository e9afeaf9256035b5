use std::sync::Arc;
use std::time::Duration;

use folio_client::{AuthFailure, Operation, RemoteSync, SyncError};
use folio_core::{ClassificationState, TransformState, aggregate};
use folio_events::{DirtyMarkerStore, MemoryMarkerStore, SharedMarkerStore};
use folio_test_support::{
    FIXTURE_USER, InMemoryBackend, SeedDocument, populated_category_fixture, reports_fixture,
};
use folio_tracker::{
    ClassificationLedger, ClassificationOutcome, DownloadSink, FolderDetailView, FolderListView,
    LIST_REFRESH_TICKS, NameDialog, NoticeKind, TrackerError,
};

fn markers() -> SharedMarkerStore {
    Arc::new(MemoryMarkerStore::default())
}

fn detail(backend: &InMemoryBackend, markers: &SharedMarkerStore, folder: i64) -> FolderDetailView {
    FolderDetailView::new(Arc::new(backend.clone()), Arc::clone(markers), folder)
        .with_poll_interval(Duration::ZERO)
}

fn list(backend: &InMemoryBackend, markers: &SharedMarkerStore) -> FolderListView {
    FolderListView::new(Arc::new(backend.clone()), Arc::clone(markers), FIXTURE_USER)
}

#[tokio::test(start_paused = true)]
async fn classification_request_is_observed_through_polling() -> anyhow::Result<()> {
    let (backend, fixture) = reports_fixture();
    let markers = markers();
    let view = FolderDetailView::new(Arc::new(backend.clone()), Arc::clone(&markers), fixture.folder)
        .with_poll_interval(Duration::from_secs(3));
    view.mount().await?;

    let state = view.snapshot();
    assert_eq!(state.unclassified.len(), 1);
    let progress = state.progress.expect("progress loaded");
    assert_eq!(progress.classification_waiting, 1);

    assert_eq!(
        view.request_classification().await?,
        ClassificationOutcome::Queued
    );
    assert_eq!(
        view.request_classification().await?,
        ClassificationOutcome::AlreadyQueued
    );
    assert_eq!(backend.calls(Operation::Classify), 1);

    let marker_before = markers.current();
    backend.complete_classification(fixture.folder);
    tokio::time::sleep(Duration::from_millis(3_500)).await;

    let state = view.snapshot();
    let progress = state.progress.expect("progress loaded");
    assert_eq!(progress.classification_done, 1);
    assert_eq!(progress.classification_pending, 0);
    assert!(state.unclassified.is_empty());
    assert!(state.pending_classification.is_none());
    assert!(markers.current() > marker_before);

    let invoices = view.open_category("Invoices").await?;
    assert_eq!(invoices.len(), 1);
    assert_eq!(invoices[0].name(), "a.pdf");
    assert!(view.is_polling());

    view.unmount();
    assert!(!view.is_polling());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn lists_are_refetched_even_when_counts_hold_still() -> anyhow::Result<()> {
    let (backend, fixture) = reports_fixture();
    let view = FolderDetailView::new(Arc::new(backend.clone()), markers(), fixture.folder)
        .with_poll_interval(Duration::from_secs(3));
    view.mount().await?;

    backend.seed_document(
        fixture.folder,
        SeedDocument::new("b.pdf")
            .transform(TransformState::Done)
            .classification(ClassificationState::Pending),
    );
    backend.delete_file(fixture.pending_pdf).await?;

    tokio::time::sleep(Duration::from_millis(3_500)).await;
    let names: Vec<_> = view.snapshot().unclassified.iter().map(|d| d.name().to_owned()).collect();
    assert_eq!(names, vec!["a.pdf"]);

    let full_cycle = Duration::from_secs(3 * u64::from(LIST_REFRESH_TICKS));
    tokio::time::sleep(full_cycle).await;
    let names: Vec<_> = view.snapshot().unclassified.iter().map(|d| d.name().to_owned()).collect();
    assert_eq!(names, vec!["b.pdf"]);

    view.unmount();
    Ok(())
}

#[tokio::test]
async fn queued_trigger_is_not_resent_before_the_worker_starts() -> anyhow::Result<()> {
    let (backend, fixture) = reports_fixture();
    backend.defer_classification_starts(true);
    let markers = markers();
    let view = detail(&backend, &markers, fixture.folder);
    view.mount().await?;
    let marker_before = markers.current();

    assert_eq!(
        view.request_classification().await?,
        ClassificationOutcome::Queued
    );
    let progress = view.snapshot().progress.expect("progress loaded");
    assert_eq!(progress.classification_waiting, 1);
    assert_eq!(progress.classification_pending, 0);

    view.refresh_progress().await?;
    assert_eq!(
        view.request_classification().await?,
        ClassificationOutcome::AlreadyQueued
    );
    assert_eq!(backend.calls(Operation::Classify), 1);
    assert_eq!(markers.current(), marker_before);

    assert_eq!(backend.start_queued_classification(fixture.folder), 1);
    view.refresh_progress().await?;
    assert_eq!(markers.current(), marker_before);
    backend.complete_classification(fixture.folder);
    view.refresh_progress().await?;
    assert!(markers.current() > marker_before);
    assert!(view.snapshot().pending_classification.is_none());

    assert_eq!(
        view.request_classification().await?,
        ClassificationOutcome::Queued
    );
    assert_eq!(backend.calls(Operation::Classify), 2);
    Ok(())
}

#[tokio::test]
async fn queued_trigger_is_remembered_across_views() -> anyhow::Result<()> {
    let (backend, fixture) = reports_fixture();
    backend.defer_classification_starts(true);
    let state_dir = tempfile::tempdir()?;
    let ledger = ClassificationLedger::new(state_dir.path());
    let markers = markers();

    let first = detail(&backend, &markers, fixture.folder);
    first.refresh_progress().await?;
    assert_eq!(
        first.request_classification().await?,
        ClassificationOutcome::Queued
    );
    ledger.store(fixture.folder, first.snapshot().pending_classification)?;
    drop(first);

    let second = detail(&backend, &markers, fixture.folder)
        .with_pending_classification(ledger.load(fixture.folder));
    second.refresh_progress().await?;
    assert_eq!(
        second.request_classification().await?,
        ClassificationOutcome::AlreadyQueued
    );
    assert_eq!(backend.calls(Operation::Classify), 1);
    Ok(())
}

#[tokio::test]
async fn refetching_an_unchanged_folder_is_idempotent() -> anyhow::Result<()> {
    let (backend, folder) = populated_category_fixture();
    let view = detail(&backend, &markers(), folder);
    view.mount().await?;
    view.open_category("Invoices").await?;

    view.refresh_all().await?;
    let first = view.snapshot();
    view.refresh_all().await?;
    assert_eq!(view.snapshot(), first);
    assert_eq!(first.unclassified.len(), 1);
    assert_eq!(first.open_category.map(|open| open.documents.len()), Some(2));
    Ok(())
}

#[tokio::test]
async fn deleting_a_category_keeps_every_document() -> anyhow::Result<()> {
    let (backend, folder) = populated_category_fixture();
    let markers = markers();
    let view = detail(&backend, &markers, folder);
    view.mount().await?;
    view.open_category("Invoices").await?;
    assert_eq!(view.snapshot().unclassified.len(), 1);

    let confirmation = view.request_delete_category("Invoices")?;
    assert!(confirmation.prompt().contains("Invoices"));
    view.delete_category(confirmation).await?;

    let state = view.snapshot();
    assert_eq!(state.unclassified.len(), 3);
    assert!(state.unclassified_expanded);
    assert!(state.open_category.is_none());
    let names: Vec<_> = state.categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Contracts"]);
    assert_eq!(backend.documents(folder).len(), 3);
    Ok(())
}

#[tokio::test]
async fn folder_rename_conflict_leaves_the_name_unchanged() -> anyhow::Result<()> {
    let backend = InMemoryBackend::new(FIXTURE_USER);
    let reports = backend.seed_folder("Reports");
    backend.seed_folder("Taxes");
    let view = list(&backend, &markers());
    view.refresh().await?;

    let mut dialog = NameDialog::rename("Reports");
    dialog.set_input("Taxes");
    let err = view
        .rename_folder(reports, &mut dialog)
        .await
        .expect_err("duplicate name");
    assert!(matches!(
        err.as_remote(),
        Some(SyncError::Conflict { .. })
    ));
    assert!(dialog.is_open());
    assert_eq!(dialog.error(), Some("folder name already exists"));
    assert_eq!(backend.folder_name(reports).as_deref(), Some("Reports"));
    assert!(view.folders().iter().any(|f| f.id == reports && f.name == "Reports"));
    assert!(view.take_notices().is_empty());
    Ok(())
}

#[tokio::test]
async fn invalid_names_never_reach_the_backend() {
    let (backend, fixture) = reports_fixture();
    let markers = markers();
    let folders = list(&backend, &markers);
    let mut dialog = NameDialog::create("   ");
    assert!(folders.create_folder(&mut dialog).await.is_err());
    assert_eq!(backend.calls(Operation::CreateFolder), 0);

    let view = detail(&backend, &markers, fixture.folder);
    let mut dialog = NameDialog::create("x".repeat(101));
    assert!(view.create_category(&mut dialog).await.is_err());
    assert!(dialog.is_open());
    assert_eq!(backend.calls(Operation::CreateCategory), 0);
}

#[tokio::test]
async fn created_folder_appears_first_and_other_views_notice() -> anyhow::Result<()> {
    let backend = InMemoryBackend::new(FIXTURE_USER);
    backend.seed_folder("Older");
    let markers = markers();
    let folders = list(&backend, &markers);
    folders.refresh().await?;

    let mut dialog = NameDialog::create(" Contracts ");
    let created = folders.create_folder(&mut dialog).await?;
    assert!(!dialog.is_open());
    assert_eq!(folders.folders()[0].id, created);
    assert_eq!(folders.folders()[0].name, "Contracts");

    let other = detail(&backend, &markers, created);
    other.mount().await?;
    let mut dialog = NameDialog::create("Invoices");
    other.create_category(&mut dialog).await?;

    let fetches = backend.calls(Operation::ListFolders);
    assert!(folders.on_focus().await?);
    assert_eq!(backend.calls(Operation::ListFolders), fetches + 1);
    assert!(!folders.on_focus().await?);
    Ok(())
}

#[tokio::test]
async fn repeated_markers_cost_a_single_refetch() -> anyhow::Result<()> {
    let (backend, _) = reports_fixture();
    let markers = markers();
    let folders = list(&backend, &markers);
    markers.publish()?;
    markers.publish()?;

    assert!(folders.on_focus().await?);
    assert!(!folders.on_focus().await?);
    assert_eq!(backend.calls(Operation::ListFolders), 1);
    Ok(())
}

#[tokio::test]
async fn expanding_an_archive_lists_its_members() -> anyhow::Result<()> {
    let backend = InMemoryBackend::new(FIXTURE_USER);
    let folder = backend.seed_folder("Scans");
    let archive = backend.seed_archive(folder, "bundle.zip", &["a.pdf", "b.pdf", "c.txt"]);
    let loose = backend.seed_document(folder, SeedDocument::new("loose.txt"));
    let view = detail(&backend, &markers(), folder);
    view.mount().await?;

    let err = view.expand_archive(loose).await.expect_err("not an archive");
    assert!(matches!(
        err.as_remote(),
        Some(SyncError::Validation { .. })
    ));
    assert_eq!(backend.calls(Operation::ExpandArchive), 0);

    let outcome = view.expand_archive(archive).await?;
    assert_eq!(outcome.message, "3 files extracted");
    assert_eq!(outcome.extracted, Some(3));

    let state = view.snapshot();
    assert_eq!(state.unclassified.len(), 4);
    assert!(state.unclassified.iter().all(|doc| !doc.file_type().is_archive()));
    assert!(state.unclassified.iter().all(|doc| doc.id() != archive));
    let members: Vec<_> = state
        .unclassified
        .iter()
        .filter(|doc| doc.id() != loose)
        .collect();
    assert_eq!(members.len(), 3);
    assert!(
        members
            .iter()
            .all(|doc| doc.transform() == TransformState::Pending)
    );
    assert_eq!(state.progress.map(|p| p.total), Some(4));
    assert!(
        view.take_notices()
            .iter()
            .any(|notice| notice.kind == NoticeKind::Info && notice.message == "3 files extracted")
    );
    Ok(())
}

#[tokio::test]
async fn responses_arriving_after_unmount_are_ignored() -> anyhow::Result<()> {
    let (backend, fixture) = reports_fixture();
    let view = Arc::new(detail(&backend, &markers(), fixture.folder));
    view.mount().await?;
    assert_eq!(view.snapshot().unclassified.len(), 1);

    backend.hold(Operation::ListUnclassified);
    let pending = tokio::spawn({
        let view = Arc::clone(&view);
        async move { view.refresh_all().await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;

    backend.seed_document(fixture.folder, SeedDocument::new("late.pdf"));
    view.unmount();
    backend.unhold(Operation::ListUnclassified);
    pending.await.expect("task").expect("stale result is not an error");

    assert_eq!(view.snapshot().unclassified.len(), 1);
    Ok(())
}

#[tokio::test]
async fn retrying_failed_classification_needs_failures() -> anyhow::Result<()> {
    let (backend, fixture) = reports_fixture();
    backend.set_classifier(|_, _| None);
    let view = detail(&backend, &markers(), fixture.folder);
    view.mount().await?;

    assert_eq!(
        view.retry_failed_classification().await?,
        ClassificationOutcome::NothingFailed
    );
    assert_eq!(backend.calls(Operation::RetryFailed), 0);

    view.request_classification().await?;
    backend.complete_classification(fixture.folder);
    let progress = view.refresh_progress().await?.expect("progress");
    assert_eq!(progress.classification_failed, 1);
    view.refresh_all().await?;
    assert!(view.snapshot().unclassified[0].is_failed());

    assert_eq!(
        view.retry_failed_classification().await?,
        ClassificationOutcome::Queued
    );
    assert_eq!(backend.calls(Operation::RetryFailed), 1);
    let progress = view.refresh_progress().await?.expect("progress");
    assert_eq!(progress.classification_pending, 1);
    Ok(())
}

#[tokio::test]
async fn progress_buckets_partition_the_folder() -> anyhow::Result<()> {
    let (backend, folder) = populated_category_fixture();
    backend.seed_document(
        folder,
        SeedDocument::new("scan.pdf")
            .transform(TransformState::Done)
            .classification(ClassificationState::InProgress),
    );
    let view = detail(&backend, &markers(), folder);
    let progress = view.refresh_progress().await?.expect("progress");

    assert_eq!(progress, aggregate(&backend.documents(folder)));
    assert_eq!(progress.bucket_sum(), progress.total);
    assert_eq!(progress.total, 4);
    assert_eq!(progress.transform_done, 3);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn expired_session_stops_polling_and_raises_a_notice() -> anyhow::Result<()> {
    let (backend, fixture) = reports_fixture();
    let view = FolderDetailView::new(Arc::new(backend.clone()), markers(), fixture.folder)
        .with_poll_interval(Duration::from_secs(3));
    view.mount().await?;
    assert!(view.is_polling());

    backend.expire_session(AuthFailure::Timeout);
    tokio::time::sleep(Duration::from_millis(3_500)).await;
    assert!(!view.is_polling());

    let state = view.snapshot();
    assert_eq!(state.notices.session_failure(), Some(AuthFailure::Timeout));
    assert_eq!(state.unclassified.len(), 1);
    let notices = view.take_notices();
    assert!(notices.iter().any(|n| n.kind == NoticeKind::SessionExpired));

    let folders = list(&backend, &markers());
    let err = folders.refresh().await.expect_err("session expired");
    assert_eq!(err.session_failure(), Some(AuthFailure::Timeout));
    Ok(())
}

#[tokio::test]
async fn documents_are_deleted_only_with_a_matching_confirmation() -> anyhow::Result<()> {
    let (backend, folder) = populated_category_fixture();
    let markers = markers();
    let view = detail(&backend, &markers, folder);
    view.mount().await?;
    let loose = view.snapshot().unclassified[0].id();

    let folders = list(&backend, &markers);
    folders.refresh().await?;
    let wrong = folders.request_delete_folder(folder)?;
    assert!(matches!(
        view.delete_file(wrong).await,
        Err(TrackerError::ConfirmationMismatch)
    ));
    assert_eq!(backend.calls(Operation::DeleteFile), 0);

    let confirmation = view.request_delete_file(loose);
    assert!(confirmation.prompt().contains("loose.txt"));
    view.delete_file(confirmation).await?;
    assert!(view.snapshot().unclassified.is_empty());
    assert_eq!(backend.documents(folder).len(), 2);

    // Deleting again after a concurrent removal still succeeds.
    let again = view.request_delete_file(loose);
    view.delete_file(again).await?;
    Ok(())
}

#[tokio::test]
async fn downloads_land_in_the_sink_directory() -> anyhow::Result<()> {
    let (backend, folder) = populated_category_fixture();
    let view = detail(&backend, &markers(), folder);
    view.mount().await?;
    let dir = tempfile::tempdir()?;
    let sink = DownloadSink::new(dir.path().join("downloads"));

    let path = view.download_category("Invoices", &sink).await?;
    assert_eq!(path, dir.path().join("downloads").join("Invoices.zip"));
    let listing = std::fs::read_to_string(&path)?;
    assert!(listing.contains("f1.pdf"));

    let loose = view.snapshot().unclassified[0].id();
    let path = view.download_file(loose, &sink).await?;
    assert_eq!(std::fs::read_to_string(path)?, "contents of loose.txt");
    Ok(())
}

#[tokio::test]
async fn uploads_show_up_as_unclassified_documents() -> anyhow::Result<()> {
    let (backend, fixture) = reports_fixture();
    let view = detail(&backend, &markers(), fixture.folder);
    view.mount().await?;

    let uploaded = view
        .upload_files(vec![
            folio_client::UploadFile {
                file_name: "b.pdf".into(),
                bytes: b"%PDF".to_vec(),
            },
            folio_client::UploadFile {
                file_name: "c.hwp".into(),
                bytes: vec![0; 4],
            },
        ])
        .await?;
    assert_eq!(uploaded, 2);
    assert_eq!(view.snapshot().unclassified.len(), 3);
    assert_eq!(backend.verify_session().await?, FIXTURE_USER);
    Ok(())
}
