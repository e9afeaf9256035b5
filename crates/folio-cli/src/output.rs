//! Output renderers and formatting helpers for CLI commands.

use anyhow::anyhow;
use folio_api_models::{Category, Folder};
use folio_core::{Document, ProgressSnapshot, derive_label};
use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}

/// Print a one-line acknowledgement, or `details` as JSON.
pub(crate) fn render_outcome(format: OutputFormat, message: &str, details: &Value) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(details),
        OutputFormat::Table => {
            println!("{message}");
            Ok(())
        }
    }
}

pub(crate) fn render_folders(folders: &[Folder], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(folders),
        OutputFormat::Table => {
            println!("{:>8} {:>7} {:<16} NAME", "ID", "FILES", "ACTIVE");
            for folder in folders {
                let active = folder
                    .last_activity
                    .map_or_else(|| "-".to_string(), |at| at.format("%Y-%m-%d %H:%M").to_string());
                println!(
                    "{:>8} {:>7} {:<16} {}",
                    folder.id, folder.file_count, active, folder.name
                );
            }
            Ok(())
        }
    }
}

pub(crate) fn render_categories(categories: &[Category], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(categories),
        OutputFormat::Table => {
            for category in categories {
                println!("{}", category.name);
            }
            Ok(())
        }
    }
}

pub(crate) fn render_documents(documents: &[Document], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(documents),
        OutputFormat::Table => {
            println!("{:>8} {:<16} {:<5} NAME", "ID", "STATUS", "TYPE");
            for doc in documents {
                println!(
                    "{:>8} {:<16} {:<5} {}",
                    doc.id(),
                    derive_label(doc).as_str(),
                    doc.file_type(),
                    doc.name()
                );
            }
            Ok(())
        }
    }
}

pub(crate) fn render_progress(progress: &ProgressSnapshot, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(progress),
        OutputFormat::Table => {
            if progress.is_empty() {
                println!("no documents");
                return Ok(());
            }
            println!("documents: {}", progress.total);
            println!(
                "extraction: {} waiting, {} running, {} done ({})",
                progress.transform_waiting,
                progress.transform_pending,
                progress.transform_done,
                format_ratio(progress.ratio(progress.transform_done))
            );
            println!(
                "classification: {} waiting, {} running, {} done, {} failed ({})",
                progress.classification_waiting,
                progress.classification_pending,
                progress.classification_done,
                progress.classification_failed,
                format_ratio(progress.ratio(progress.classification_done))
            );
            Ok(())
        }
    }
}

/// Single-line form used while watching.
pub(crate) fn render_progress_line(progress: &ProgressSnapshot, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            let line = serde_json::to_string(progress)
                .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
            println!("{line}");
        }
        OutputFormat::Table => println!(
            "extracted {}/{}  classified {}/{}  running {}  failed {}",
            progress.transform_done,
            progress.total,
            progress.classification_done,
            progress.total,
            progress.transform_pending + progress.classification_pending,
            progress.classification_failed
        ),
    }
    Ok(())
}

pub(crate) fn format_ratio(ratio: Option<f64>) -> String {
    ratio.map_or_else(|| "-".to_string(), |ratio| format!("{:.1}%", ratio * 100.0))
}
