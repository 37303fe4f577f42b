use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::StageError;

/// Exclusive lock held for the duration of one production build.
///
/// Released when dropped. The lock file itself is never unlinked: removing a
/// still-locked file would let a second process lock a fresh inode at the
/// same path.
#[derive(Debug)]
pub struct BuildLock {
    _file: File,
    path: PathBuf,
}

impl BuildLock {
    pub fn acquire(path: &Path) -> Result<Self, StageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StageError::CreateDir {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)
            .map_err(|e| StageError::Lock {
                path: path.to_path_buf(),
                source: e,
            })?;

        if let Err(e) = file.try_lock_exclusive() {
            tracing::debug!(path = %path.display(), error = %e, "build lock contended");
            return Err(StageError::Locked {
                path: path.to_path_buf(),
            });
        }

        tracing::debug!(path = %path.display(), "build lock acquired");
        Ok(Self {
            _file: file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
