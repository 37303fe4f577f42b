use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::{StageError, vcs};

/// Prefix of every temp build context directory.
pub const CONTEXT_PREFIX: &str = "dockyard-build-";

/// Paths that are never staged, regardless of .gitignore content.
const ALWAYS_EXCLUDED: &[&str] = &[".git"];

/// A disposable build context.
///
/// Each context gets a fresh, uniquely named directory. It is deleted by
/// [`TempContext::remove`], or on drop when the owner bails out early, so
/// the working tree is never touched by a build.
#[derive(Debug)]
pub struct TempContext {
    dir: TempDir,
}

impl TempContext {
    /// Create a new context directory below `parent`, creating `parent` if needed.
    pub fn create(parent: &Path) -> Result<Self, StageError> {
        std::fs::create_dir_all(parent).map_err(|e| StageError::CreateDir {
            path: parent.to_path_buf(),
            source: e,
        })?;

        let dir = tempfile::Builder::new()
            .prefix(CONTEXT_PREFIX)
            .tempdir_in(parent)
            .map_err(|e| StageError::CreateTemp {
                path: parent.to_path_buf(),
                source: e,
            })?;

        tracing::debug!(path = %dir.path().display(), "temp build context created");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Copy the project files git knows about into the context.
    ///
    /// Paths under `.git` and under any of `excludes` (relative to
    /// `project_dir`) are skipped. Files listed by git but missing on disk
    /// (deleted, not yet committed) and submodule directories are skipped
    /// as well. Returns the number of files copied.
    pub fn stage_sources(&self, project_dir: &Path, excludes: &[PathBuf]) -> Result<usize, StageError> {
        let files = vcs::ls_files(project_dir)?;
        let mut copied = 0;

        for relative_path in &files {
            if ALWAYS_EXCLUDED
                .iter()
                .any(|ex| relative_path.starts_with(ex))
                || excludes.iter().any(|ex| relative_path.starts_with(ex))
            {
                continue;
            }

            let src = project_dir.join(relative_path);
            if !src.is_file() {
                tracing::debug!(path = %src.display(), "not a regular file, skipping");
                continue;
            }

            let dst = self.path().join(relative_path);
            if let Some(parent) = dst.parent() {
                std::fs::create_dir_all(parent).map_err(|e| StageError::CreateDir {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }

            std::fs::copy(&src, &dst).map_err(|e| StageError::CopyFile {
                path: src,
                source: e,
            })?;
            copied += 1;
        }

        tracing::debug!(files = copied, "sources staged");
        Ok(copied)
    }

    /// Delete the context, reporting failures instead of ignoring them.
    pub fn remove(self) -> Result<(), StageError> {
        let path = self.dir.path().to_path_buf();
        self.dir
            .close()
            .map_err(|e| StageError::RemoveTemp { path: path.clone(), source: e })?;
        tracing::debug!(path = %path.display(), "temp build context removed");
        Ok(())
    }
}
