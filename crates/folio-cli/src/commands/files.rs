use std::path::Path;

use anyhow::Context;
use folio_client::UploadFile;
use serde_json::json;

use crate::cli::{FileArgs, FileRemoveArgs, FolderArgs, UploadArgs};
use crate::client::{AppContext, CliError, CliResult, confirm};
use crate::output::{render_documents, render_outcome};

pub(crate) async fn handle_list(ctx: &AppContext, args: FolderArgs) -> CliResult<()> {
    let view = ctx.folder_view(args.folder);
    view.refresh_all().await?;
    render_documents(&view.snapshot().unclassified, ctx.output)
}

pub(crate) async fn handle_remove(ctx: &AppContext, args: FileRemoveArgs) -> CliResult<()> {
    let view = ctx.folder_view(args.folder);
    view.refresh_all().await?;
    let confirmation = view.request_delete_file(args.file);
    confirm(&confirmation, args.yes)?;
    view.delete_file(confirmation).await?;
    render_outcome(
        ctx.output,
        &format!("deleted document {}", args.file),
        &json!({"file_id": args.file, "deleted": true}),
    )
}

pub(crate) async fn handle_unzip(ctx: &AppContext, args: FileArgs) -> CliResult<()> {
    let view = ctx.folder_view(args.folder);
    view.refresh_all().await?;
    let outcome = view.expand_archive(args.file).await?;
    render_outcome(
        ctx.output,
        &outcome.message,
        &json!({"file_id": args.file, "extracted": outcome.extracted, "message": outcome.message}),
    )
}

pub(crate) async fn handle_upload(ctx: &AppContext, args: UploadArgs) -> CliResult<()> {
    let mut files = Vec::with_capacity(args.paths.len());
    for path in &args.paths {
        files.push(read_upload(path).await?);
    }
    let view = ctx.folder_view(args.folder);
    let uploaded = view.upload_files(files).await?;
    render_outcome(
        ctx.output,
        &format!("uploaded {uploaded} document(s)"),
        &json!({"folder_id": args.folder, "uploaded": uploaded}),
    )
}

async fn read_upload(path: &Path) -> CliResult<UploadFile> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(ToString::to_string)
        .ok_or_else(|| CliError::validation(format!("{} is not a file path", path.display())))?;
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
        .map_err(CliError::failure)?;
    Ok(UploadFile { file_name, bytes })
}
