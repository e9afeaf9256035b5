use folio_tracker::NameDialog;
use serde_json::json;

use crate::cli::{CategoryArgs, CategoryRemoveArgs, CategoryRenameArgs, FolderArgs};
use crate::client::{AppContext, CliResult, confirm};
use crate::output::{render_categories, render_documents, render_outcome};

pub(crate) async fn handle_list(ctx: &AppContext, args: FolderArgs) -> CliResult<()> {
    let view = ctx.folder_view(args.folder);
    view.refresh_all().await?;
    render_categories(&view.snapshot().categories, ctx.output)
}

pub(crate) async fn handle_create(ctx: &AppContext, args: CategoryArgs) -> CliResult<()> {
    let view = ctx.folder_view(args.folder);
    let mut dialog = NameDialog::create(args.name);
    view.create_category(&mut dialog).await?;
    let name = dialog.input().trim();
    render_outcome(
        ctx.output,
        &format!("created category '{name}'"),
        &json!({"folder_id": args.folder, "name": name}),
    )
}

pub(crate) async fn handle_rename(ctx: &AppContext, args: CategoryRenameArgs) -> CliResult<()> {
    let view = ctx.folder_view(args.folder);
    let mut dialog = NameDialog::rename(args.name.as_str());
    dialog.set_input(args.new_name);
    view.rename_category(&mut dialog).await?;
    let new_name = dialog.input().trim();
    render_outcome(
        ctx.output,
        &format!("renamed category '{}' to '{new_name}'", args.name),
        &json!({"folder_id": args.folder, "from": args.name, "to": new_name}),
    )
}

pub(crate) async fn handle_remove(ctx: &AppContext, args: CategoryRemoveArgs) -> CliResult<()> {
    let view = ctx.folder_view(args.folder);
    view.refresh_all().await?;
    let confirmation = view.request_delete_category(&args.name)?;
    confirm(&confirmation, args.yes)?;
    view.delete_category(confirmation).await?;
    let unclassified = view.snapshot().unclassified.len();
    render_outcome(
        ctx.output,
        &format!(
            "deleted category '{}'; {unclassified} document(s) are now unclassified",
            args.name
        ),
        &json!({"folder_id": args.folder, "name": args.name, "unclassified": unclassified}),
    )
}

pub(crate) async fn handle_files(ctx: &AppContext, args: CategoryArgs) -> CliResult<()> {
    let view = ctx.folder_view(args.folder);
    let documents = view.open_category(&args.name).await?;
    render_documents(&documents, ctx.output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    use crate::commands::test_support::context_for;

    fn mock_folder(server: &MockServer) {
        server.mock(|when, then| {
            when.method(GET).path("/folders/3/categories");
            then.status(200)
                .json_body(json!({"categories": ["Invoices", "Contracts"]}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/files/3/unclassified");
            then.status(200).json_body(json!({"files": []}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/folders/3/progress");
            then.status(200).json_body(json!({
                "total": 0, "transform_waiting": 0, "transform_pending": 0, "transform_done": 0,
                "classification_waiting": 0, "classification_pending": 0, "classification_done": 0
            }));
        });
    }

    #[tokio::test]
    async fn unknown_category_is_not_deleted() {
        let server = MockServer::start_async().await;
        mock_folder(&server);
        let delete = server.mock(|when, then| {
            when.method(DELETE);
            then.status(200);
        });
        let dir = tempfile::tempdir().expect("tempdir");
        let err = handle_remove(
            &context_for(&server, dir.path().to_path_buf()),
            CategoryRemoveArgs {
                folder: 3,
                name: "Receipts".into(),
                yes: true,
            },
        )
        .await
        .expect_err("unknown category");
        assert_eq!(err.exit_code(), 3);
        delete.assert_hits(0);
    }

    #[tokio::test]
    async fn confirmed_removal_hits_the_category_endpoint() {
        let server = MockServer::start_async().await;
        mock_folder(&server);
        let delete = server.mock(|when, then| {
            when.method(DELETE).path("/folders/3/categories/Invoices");
            then.status(200).json_body(json!({"message": "deleted"}));
        });
        let dir = tempfile::tempdir().expect("tempdir");
        handle_remove(
            &context_for(&server, dir.path().to_path_buf()),
            CategoryRemoveArgs {
                folder: 3,
                name: "Invoices".into(),
                yes: true,
            },
        )
        .await
        .expect("deleted");
        delete.assert();
    }

    #[tokio::test]
    async fn category_files_are_listed() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET).path("/folders/3/categories/Invoices/files");
            then.status(200).json_body(json!({"files": [
                {"file_id": 1, "file_name": "a.pdf", "transform_state": 2,
                 "classification_state": 2, "category": "Invoices"}
            ]}));
        });
        let dir = tempfile::tempdir().expect("tempdir");
        handle_files(
            &context_for(&server, dir.path().to_path_buf()),
            CategoryArgs {
                folder: 3,
                name: "Invoices".into(),
            },
        )
        .await
        .expect("listed");
        mock.assert();
    }
}
