use anyhow::anyhow;
use folio_tracker::NameDialog;
use serde_json::json;

use crate::cli::{FolderRemoveArgs, FolderRenameArgs, NameArgs};
use crate::client::{AppContext, CliError, CliResult, confirm};
use crate::output::{render_folders, render_outcome};

pub(crate) async fn handle_list(ctx: &AppContext) -> CliResult<()> {
    let view = ctx.folder_list()?;
    view.refresh().await?;
    render_folders(&view.folders(), ctx.output)
}

pub(crate) async fn handle_create(ctx: &AppContext, args: NameArgs) -> CliResult<()> {
    let view = ctx.folder_list()?;
    let mut dialog = NameDialog::create(args.name);
    let folder_id = view.create_folder(&mut dialog).await?;
    render_outcome(
        ctx.output,
        &format!("created folder {folder_id}"),
        &json!({"folder_id": folder_id}),
    )
}

pub(crate) async fn handle_rename(ctx: &AppContext, args: FolderRenameArgs) -> CliResult<()> {
    let view = ctx.folder_list()?;
    view.refresh().await?;
    let current = view
        .folders()
        .into_iter()
        .find(|folder| folder.id == args.folder)
        .ok_or_else(|| CliError::failure(anyhow!("folder {} not found", args.folder)))?;
    let mut dialog = NameDialog::rename(current.name);
    dialog.set_input(args.name);
    view.rename_folder(args.folder, &mut dialog).await?;
    render_outcome(
        ctx.output,
        &format!("renamed folder {}", args.folder),
        &json!({"folder_id": args.folder, "name": dialog.input().trim()}),
    )
}

pub(crate) async fn handle_remove(ctx: &AppContext, args: FolderRemoveArgs) -> CliResult<()> {
    let view = ctx.folder_list()?;
    view.refresh().await?;
    let confirmation = view.request_delete_folder(args.folder)?;
    confirm(&confirmation, args.yes)?;
    view.delete_folder(confirmation).await?;
    render_outcome(
        ctx.output,
        &format!("deleted folder {}", args.folder),
        &json!({"folder_id": args.folder, "deleted": true}),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    use crate::commands::test_support::context_for;

    fn folders_body() -> serde_json::Value {
        json!({"folders": [
            {"folder_id": 3, "folder_name": "Reports", "file_count": 2},
            {"folder_id": 4, "folder_name": "Taxes", "file_count": 0}
        ]})
    }

    #[tokio::test]
    async fn rename_conflict_is_an_operational_failure() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/folders/1");
            then.status(200).json_body(folders_body());
        });
        let rename = server.mock(|when, then| {
            when.method(PATCH)
                .path("/folders/3/rename")
                .json_body(json!({"new_name": "Taxes"}));
            then.status(400)
                .json_body(json!({"detail": "이미 존재하는 폴더 이름입니다."}));
        });
        let dir = tempfile::tempdir().expect("tempdir");
        let err = handle_rename(
            &context_for(&server, dir.path().to_path_buf()),
            FolderRenameArgs {
                folder: 3,
                name: "Taxes".into(),
            },
        )
        .await
        .expect_err("conflict");
        rename.assert();
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.display_message(), "이미 존재하는 폴더 이름입니다.");
    }

    #[tokio::test]
    async fn blank_name_is_rejected_before_any_request() {
        let server = MockServer::start_async().await;
        let create = server.mock(|when, then| {
            when.method(POST).path("/folders/create");
            then.status(200).json_body(json!({"folder_id": 9}));
        });
        let dir = tempfile::tempdir().expect("tempdir");
        let err = handle_create(
            &context_for(&server, dir.path().to_path_buf()),
            NameArgs { name: "  ".into() },
        )
        .await
        .expect_err("blank");
        assert_eq!(err.exit_code(), 2);
        create.assert_hits(0);
    }

    #[tokio::test]
    async fn remove_with_yes_deletes_the_folder() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/folders/1");
            then.status(200).json_body(folders_body());
        });
        let delete = server.mock(|when, then| {
            when.method(DELETE).path("/folders/4");
            then.status(200).json_body(json!({"message": "deleted"}));
        });
        let dir = tempfile::tempdir().expect("tempdir");
        handle_remove(
            &context_for(&server, dir.path().to_path_buf()),
            FolderRemoveArgs {
                folder: 4,
                yes: true,
            },
        )
        .await
        .expect("deleted");
        delete.assert();
    }
}
