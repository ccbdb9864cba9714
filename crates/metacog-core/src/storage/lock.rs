use std::fs::{self, File};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::CoreError;

/// Exclusive advisory lock on the store's lock file.
///
/// Held for the lifetime of the guard and released on drop, so every exit
/// path (including `?` returns and panics) lets go of it.
#[derive(Debug)]
pub struct StoreLock {
    file: File,
    path: PathBuf,
}

impl StoreLock {
    /// Block until the exclusive lock on `path` is held. There is no timeout.
    pub fn acquire(path: &Path) -> Result<Self, CoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(CoreError::Lock)?;
        }
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(CoreError::Lock)?;
        file.lock_exclusive().map_err(CoreError::Lock)?;
        tracing::trace!(path = %path.display(), "acquired state lock");
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!("Failed to release state lock {}: {e}", self.path.display());
        } else {
            tracing::trace!(path = %self.path.display(), "released state lock");
        }
    }
}
