//! Writing downloaded payloads to disk.

use std::io::Write;
use std::path::{Path, PathBuf};

use folio_client::DownloadPayload;
use tempfile::NamedTempFile;
use tracing::info;

use crate::error::{TrackerError, TrackerResult};

/// Destination directory for downloads.
///
/// Payloads are staged in a temporary file inside the directory and only
/// renamed into place after a flush and sync, so an interrupted download never
/// leaves a partial file under the final name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSink {
    dir: PathBuf,
}

impl DownloadSink {
    /// Sink writing into `dir`, created on first use.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Destination directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist `payload`, naming it after the server's suggestion or
    /// `fallback_name`. Returns the final path.
    ///
    /// # Errors
    /// Returns [`TrackerError::Download`] when the directory or file cannot be
    /// written; no file is left behind in that case.
    pub async fn store(
        &self,
        payload: DownloadPayload,
        fallback_name: &str,
    ) -> TrackerResult<PathBuf> {
        let name = payload
            .file_name
            .as_deref()
            .and_then(sanitize_file_name)
            .or_else(|| sanitize_file_name(fallback_name))
            .unwrap_or_else(|| "download".to_string());
        let dir = self.dir.clone();
        let target = dir.join(&name);
        let bytes = payload.bytes;

        let written = target.clone();
        tokio::task::spawn_blocking(move || write_atomically(&dir, &written, &bytes))
            .await
            .map_err(|err| TrackerError::Download {
                path: target.clone(),
                source: std::io::Error::other(err),
            })??;
        info!(path = %target.display(), "download saved");
        Ok(target)
    }
}

fn write_atomically(dir: &Path, target: &Path, bytes: &[u8]) -> TrackerResult<()> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source: std::io::Error| TrackerError::Download { path, source }
    };
    std::fs::create_dir_all(dir).map_err(io_err(dir))?;
    let mut staged = NamedTempFile::new_in(dir).map_err(io_err(dir))?;
    staged.write_all(bytes).map_err(io_err(target))?;
    staged.flush().map_err(io_err(target))?;
    staged.as_file().sync_all().map_err(io_err(target))?;
    staged
        .persist(target)
        .map_err(|err| TrackerError::Download {
            path: target.to_path_buf(),
            source: err.error,
        })?;
    Ok(())
}

/// Last path component of `raw`, or `None` when nothing usable remains.
pub fn sanitize_file_name(raw: &str) -> Option<String> {
    let name = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
        .trim_matches('.');
    (!name.is_empty()).then(|| name.to_string())
}
