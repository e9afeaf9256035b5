//! JSON state files shared between processes.
//!
//! Writers hold an exclusive advisory lock on a sibling `.lock` file for the
//! whole read-modify-write, so concurrent processes never persist a value
//! computed from a stale read. Readers take no lock: every write lands through
//! an atomic rename.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use tracing::warn;

use crate::error::{MarkerError, MarkerResult};

/// JSON document on disk, updated under a cross-process lock.
#[derive(Debug, Clone)]
pub struct LockedJsonFile {
    path: PathBuf,
    lock_path: PathBuf,
}

impl LockedJsonFile {
    /// File at `path`; the lock lives next to it as `<name>.lock`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut lock_name = path.file_name().map(ToOwned::to_owned).unwrap_or_default();
        lock_name.push(".lock");
        let lock_path = path.with_file_name(lock_name);
        Self { path, lock_path }
    }

    /// Location of the JSON document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current contents; missing, unreadable or corrupt files read as the
    /// default value.
    #[must_use]
    pub fn read<T>(&self) -> T
    where
        T: DeserializeOwned + Default,
    {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return T::default(),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "state file unreadable");
                return T::default();
            }
        };
        serde_json::from_slice(&raw).unwrap_or_else(|err| {
            warn!(path = %self.path.display(), error = %err, "state file corrupt; resetting");
            T::default()
        })
    }

    /// Read, modify and persist the document while holding the lock.
    ///
    /// # Errors
    /// Returns [`MarkerError`] when the lock cannot be taken or the new
    /// contents cannot be written.
    pub fn update<T, R>(&self, apply: impl FnOnce(&mut T) -> R) -> MarkerResult<R>
    where
        T: DeserializeOwned + Serialize + Default,
    {
        let dir = self.dir();
        fs::create_dir_all(&dir).map_err(|err| MarkerError::io(&dir, err))?;
        let lock = self.lock()?;
        let mut value = self.read::<T>();
        let result = apply(&mut value);
        self.write(&dir, &value)?;
        drop(lock);
        Ok(result)
    }

    fn dir(&self) -> PathBuf {
        self.path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    }

    fn lock(&self) -> MarkerResult<File> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)
            .map_err(|err| MarkerError::io(&self.lock_path, err))?;
        file.lock()
            .map_err(|err| MarkerError::io(&self.lock_path, err))?;
        Ok(file)
    }

    fn write<T: Serialize>(&self, dir: &Path, value: &T) -> MarkerResult<()> {
        let encoded = serde_json::to_vec_pretty(value)?;
        let mut staged = NamedTempFile::new_in(dir).map_err(|err| MarkerError::io(dir, err))?;
        staged
            .write_all(&encoded)
            .and_then(|()| staged.as_file().sync_all())
            .map_err(|err| MarkerError::io(staged.path(), err))?;
        staged
            .persist(&self.path)
            .map_err(|err| MarkerError::io(&self.path, err.error))?;
        Ok(())
    }
}
