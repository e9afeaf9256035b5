//! Argument parsing, configuration layering and command dispatch.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use folio_config::{ConfigLayer, ConfigSources, TrackerConfig, load_with, validate};
use folio_core::{FileId, FolderId, UserId};
use folio_telemetry::{LogFormat, LoggingConfig, build_sha, command_span, init_logging};
use tracing::Instrument;

use crate::client::{AppContext, CliResult};
use crate::commands::{categories, files, folders, pipeline, session, transfer};

/// Parses CLI arguments, executes the requested command and returns the
/// process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            return err.exit_code();
        }
    };

    let logging = LoggingConfig {
        level: &config.log_level,
        format: LogFormat::from_setting(config.log_format.as_deref()),
        build_sha: build_sha(),
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: logging disabled: {err:#}");
    }

    let span = command_span(command_label(&cli.command), config.user_id);
    let Cli {
        command, output, ..
    } = cli;
    let result = async move {
        let ctx = AppContext::from_config(&config, output)?;
        dispatch(command, &ctx).await
    }
    .instrument(span)
    .await;

    match result {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

/// Config files and `FOLIO_*` variables, overridden by explicit flags.
fn resolve_config(cli: &Cli) -> CliResult<TrackerConfig> {
    let sources = cli
        .config
        .as_ref()
        .map_or_else(ConfigSources::standard, ConfigSources::single);
    let mut config = load_with(&sources, |key| std::env::var(key).ok())?;
    config.apply(&cli.overrides())?;
    validate(&config)?;
    Ok(config)
}

async fn dispatch(command: Command, ctx: &AppContext) -> CliResult<()> {
    match command {
        Command::Verify => session::handle_verify(ctx).await,
        Command::Folders(command) => match command {
            FolderCommand::Ls => folders::handle_list(ctx).await,
            FolderCommand::Create(args) => folders::handle_create(ctx, args).await,
            FolderCommand::Rename(args) => folders::handle_rename(ctx, args).await,
            FolderCommand::Rm(args) => folders::handle_remove(ctx, args).await,
        },
        Command::Categories(command) => match command {
            CategoryCommand::Ls(args) => categories::handle_list(ctx, args).await,
            CategoryCommand::Create(args) => categories::handle_create(ctx, args).await,
            CategoryCommand::Rename(args) => categories::handle_rename(ctx, args).await,
            CategoryCommand::Rm(args) => categories::handle_remove(ctx, args).await,
            CategoryCommand::Files(args) => categories::handle_files(ctx, args).await,
        },
        Command::Files(command) => match command {
            FileCommand::Ls(args) => files::handle_list(ctx, args).await,
            FileCommand::Rm(args) => files::handle_remove(ctx, args).await,
            FileCommand::Unzip(args) => files::handle_unzip(ctx, args).await,
            FileCommand::Upload(args) => files::handle_upload(ctx, args).await,
        },
        Command::Classify(args) => pipeline::handle_classify(ctx, args).await,
        Command::Progress(args) => pipeline::handle_progress(ctx, args).await,
        Command::Download(command) => transfer::handle_download(ctx, command).await,
    }
}

#[derive(Parser)]
#[command(name = "folio", about = "Track documents through extraction and classification")]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "FOLIO_CONFIG",
        help = "Read this TOML file instead of the standard locations"
    )]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Backend base URL")]
    api_url: Option<String>,
    #[arg(long, global = true, help = "Signed-in user")]
    user_id: Option<UserId>,
    #[arg(long, global = true, help = "Bearer token issued by the auth service")]
    token: Option<String>,
    #[arg(long, global = true, help = "Per-request timeout in seconds")]
    timeout: Option<u64>,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    output: OutputFormat,
    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn overrides(&self) -> ConfigLayer {
        ConfigLayer {
            api_url: self.api_url.clone(),
            user_id: self.user_id,
            token: self.token.clone(),
            http_timeout_secs: self.timeout,
            ..ConfigLayer::default()
        }
    }
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Check that the configured credential is accepted.
    Verify,
    /// Manage folders.
    #[command(subcommand)]
    Folders(FolderCommand),
    /// Manage categories of a folder.
    #[command(subcommand)]
    Categories(CategoryCommand),
    /// Manage documents of a folder.
    #[command(subcommand)]
    Files(FileCommand),
    /// Queue documents for classification.
    Classify(ClassifyArgs),
    /// Show folder progress.
    Progress(ProgressArgs),
    /// Save folders, categories or documents locally.
    #[command(subcommand)]
    Download(DownloadCommand),
}

#[derive(Subcommand)]
pub(crate) enum FolderCommand {
    Ls,
    Create(NameArgs),
    Rename(FolderRenameArgs),
    Rm(FolderRemoveArgs),
}

#[derive(Args)]
pub(crate) struct NameArgs {
    pub(crate) name: String,
}

#[derive(Args)]
pub(crate) struct FolderRenameArgs {
    pub(crate) folder: FolderId,
    pub(crate) name: String,
}

#[derive(Args)]
pub(crate) struct FolderRemoveArgs {
    pub(crate) folder: FolderId,
    #[arg(long, short = 'y', help = "Skip the confirmation prompt")]
    pub(crate) yes: bool,
}

#[derive(Subcommand)]
pub(crate) enum CategoryCommand {
    Ls(FolderArgs),
    Create(CategoryArgs),
    Rename(CategoryRenameArgs),
    Rm(CategoryRemoveArgs),
    Files(CategoryArgs),
}

#[derive(Args)]
pub(crate) struct FolderArgs {
    pub(crate) folder: FolderId,
}

#[derive(Args)]
pub(crate) struct CategoryArgs {
    pub(crate) folder: FolderId,
    pub(crate) name: String,
}

#[derive(Args)]
pub(crate) struct CategoryRenameArgs {
    pub(crate) folder: FolderId,
    pub(crate) name: String,
    pub(crate) new_name: String,
}

#[derive(Args)]
pub(crate) struct CategoryRemoveArgs {
    pub(crate) folder: FolderId,
    pub(crate) name: String,
    #[arg(long, short = 'y', help = "Skip the confirmation prompt")]
    pub(crate) yes: bool,
}

#[derive(Subcommand)]
pub(crate) enum FileCommand {
    /// Documents without a category.
    Ls(FolderArgs),
    Rm(FileRemoveArgs),
    /// Expand a ZIP document into its members.
    Unzip(FileArgs),
    Upload(UploadArgs),
}

#[derive(Args)]
pub(crate) struct FileArgs {
    pub(crate) folder: FolderId,
    pub(crate) file: FileId,
}

#[derive(Args)]
pub(crate) struct FileRemoveArgs {
    pub(crate) folder: FolderId,
    pub(crate) file: FileId,
    #[arg(long, short = 'y', help = "Skip the confirmation prompt")]
    pub(crate) yes: bool,
}

#[derive(Args)]
pub(crate) struct UploadArgs {
    pub(crate) folder: FolderId,
    #[arg(required = true)]
    pub(crate) paths: Vec<PathBuf>,
}

#[derive(Args)]
pub(crate) struct ClassifyArgs {
    pub(crate) folder: FolderId,
    #[arg(long, help = "Re-queue documents whose classification failed")]
    pub(crate) retry_failed: bool,
}

#[derive(Args)]
pub(crate) struct ProgressArgs {
    pub(crate) folder: FolderId,
    #[arg(long, help = "Keep polling until extraction and classification settle")]
    pub(crate) watch: bool,
}

#[derive(Subcommand)]
pub(crate) enum DownloadCommand {
    Folder(DownloadFolderArgs),
    Category(DownloadCategoryArgs),
    File(DownloadFileArgs),
}

#[derive(Args)]
pub(crate) struct OutArgs {
    #[arg(long, help = "Destination directory (defaults to the configured download dir)")]
    pub(crate) out: Option<PathBuf>,
}

#[derive(Args)]
pub(crate) struct DownloadFolderArgs {
    pub(crate) folder: FolderId,
    #[command(flatten)]
    pub(crate) out: OutArgs,
}

#[derive(Args)]
pub(crate) struct DownloadCategoryArgs {
    pub(crate) folder: FolderId,
    pub(crate) name: String,
    #[command(flatten)]
    pub(crate) out: OutArgs,
}

#[derive(Args)]
pub(crate) struct DownloadFileArgs {
    pub(crate) folder: FolderId,
    pub(crate) file: FileId,
    #[command(flatten)]
    pub(crate) out: OutArgs,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Verify => "verify",
        Command::Folders(FolderCommand::Ls) => "folders_ls",
        Command::Folders(FolderCommand::Create(_)) => "folders_create",
        Command::Folders(FolderCommand::Rename(_)) => "folders_rename",
        Command::Folders(FolderCommand::Rm(_)) => "folders_rm",
        Command::Categories(CategoryCommand::Ls(_)) => "categories_ls",
        Command::Categories(CategoryCommand::Create(_)) => "categories_create",
        Command::Categories(CategoryCommand::Rename(_)) => "categories_rename",
        Command::Categories(CategoryCommand::Rm(_)) => "categories_rm",
        Command::Categories(CategoryCommand::Files(_)) => "categories_files",
        Command::Files(FileCommand::Ls(_)) => "files_ls",
        Command::Files(FileCommand::Rm(_)) => "files_rm",
        Command::Files(FileCommand::Unzip(_)) => "files_unzip",
        Command::Files(FileCommand::Upload(_)) => "files_upload",
        Command::Classify(_) => "classify",
        Command::Progress(_) => "progress",
        Command::Download(DownloadCommand::Folder(_)) => "download_folder",
        Command::Download(DownloadCommand::Category(_)) => "download_category",
        Command::Download(DownloadCommand::File(_)) => "download_file",
    }
}
