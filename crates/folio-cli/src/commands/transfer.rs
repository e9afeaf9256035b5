use folio_tracker::DownloadSink;
use serde_json::json;

use crate::cli::{DownloadCommand, OutArgs};
use crate::client::{AppContext, CliResult};
use crate::output::render_outcome;

pub(crate) async fn handle_download(ctx: &AppContext, command: DownloadCommand) -> CliResult<()> {
    let path = match command {
        DownloadCommand::Folder(args) => {
            let sink = sink_for(ctx, args.out);
            ctx.folder_view(args.folder).download_folder(&sink).await?
        }
        DownloadCommand::Category(args) => {
            let sink = sink_for(ctx, args.out);
            ctx.folder_view(args.folder)
                .download_category(&args.name, &sink)
                .await?
        }
        DownloadCommand::File(args) => {
            let sink = sink_for(ctx, args.out);
            ctx.folder_view(args.folder)
                .download_file(args.file, &sink)
                .await?
        }
    };
    render_outcome(
        ctx.output,
        &format!("saved {}", path.display()),
        &json!({"path": path}),
    )
}

fn sink_for(ctx: &AppContext, out: OutArgs) -> DownloadSink {
    DownloadSink::new(out.out.unwrap_or_else(|| ctx.download_dir.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    use crate::cli::DownloadFolderArgs;
    use crate::commands::test_support::context_for;

    #[tokio::test]
    async fn folder_archive_lands_in_the_default_directory() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/folders/download/3");
            then.status(200)
                .header("content-disposition", "attachment; filename=\"Reports.zip\"")
                .body("PK");
        });
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = context_for(&server, dir.path().join("downloads"));
        let out = OutArgs { out: None };

        handle_download(
            &ctx,
            DownloadCommand::Folder(DownloadFolderArgs { folder: 3, out }),
        )
        .await
        .expect("downloaded");
        let saved = std::fs::read(dir.path().join("downloads").join("Reports.zip")).expect("saved");
        assert_eq!(saved, b"PK");
    }
}

