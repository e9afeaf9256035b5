use std::time::Duration;

use folio_core::ProgressSnapshot;
use folio_tracker::{ClassificationOutcome, FolderDetailView};
use serde_json::json;
use tokio::time::{MissedTickBehavior, interval};
use tracing::warn;

use crate::cli::{ClassifyArgs, ProgressArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{render_outcome, render_progress, render_progress_line};

pub(crate) async fn handle_classify(ctx: &AppContext, args: ClassifyArgs) -> CliResult<()> {
    let view = ctx.tracked_folder_view(args.folder);
    view.refresh_progress().await?;
    let outcome = if args.retry_failed {
        view.retry_failed_classification().await
    } else {
        view.request_classification().await
    };
    ctx.remember_classification(&view)?;
    let outcome = outcome?;
    let (label, message) = match outcome {
        ClassificationOutcome::Queued if args.retry_failed => ("queued", "failed documents re-queued"),
        ClassificationOutcome::Queued => ("queued", "classification requested"),
        ClassificationOutcome::AlreadyQueued => {
            ("already_queued", "classification already in progress")
        }
        ClassificationOutcome::NothingFailed => ("nothing_failed", "no failed documents to retry"),
    };
    render_outcome(
        ctx.output,
        message,
        &json!({"folder_id": args.folder, "outcome": label}),
    )
}

pub(crate) async fn handle_progress(ctx: &AppContext, args: ProgressArgs) -> CliResult<()> {
    let view = ctx.tracked_folder_view(args.folder);
    let result = if args.watch {
        watch(ctx, &view).await
    } else {
        current(&view)
            .await
            .and_then(|progress| render_progress(&progress, ctx.output))
    };
    ctx.remember_classification(&view)?;
    result
}

async fn current(view: &FolderDetailView) -> CliResult<ProgressSnapshot> {
    view.refresh_progress()
        .await?
        .ok_or_else(|| CliError::validation("folder progress is unavailable"))
}

/// Print a line per poll until nothing is queued or running, or until Ctrl-C.
async fn watch(ctx: &AppContext, view: &FolderDetailView) -> CliResult<()> {
    let period = if ctx.poll_interval.is_zero() {
        Duration::from_secs(1)
    } else {
        ctx.poll_interval
    };
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => return Ok(()),
            _ = ticker.tick() => {}
        }
        match current(view).await {
            Ok(progress) => {
                render_progress_line(&progress, ctx.output)?;
                if settled(&progress) {
                    return Ok(());
                }
            }
            Err(CliError::Failure(err)) => warn!(error = %format!("{err:#}"), "progress poll failed"),
            Err(err) => return Err(err),
        }
    }
}

const fn settled(progress: &ProgressSnapshot) -> bool {
    progress.extraction_settled() && progress.classification_settled()
}
