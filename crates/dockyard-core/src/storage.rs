use std::path::{Path, PathBuf};

/// Content of the exclusion marker written at the storage root.
pub const GITIGNORE_CONTENT: &str = "*";

/// Persistent working directory shared by every dockyard invocation.
///
/// ```text
/// <root>/
///   .gitignore      "*"
///   logs/nginx/
///   tmp/            temp build contexts
///   build.lock
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    root: PathBuf,
}

impl StorageLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn gitignore_path(&self) -> PathBuf {
        self.root.join(".gitignore")
    }

    pub fn nginx_logs_dir(&self) -> PathBuf {
        self.root.join("logs").join("nginx")
    }

    /// Parent directory of temp build contexts.
    pub fn tmp_dir(&self) -> PathBuf {
        self.root.join("tmp")
    }

    pub fn lock_path(&self) -> PathBuf {
        self.root.join("build.lock")
    }

    /// Create the layout if any part of it is missing.
    ///
    /// Existing directories and an existing `.gitignore` are left untouched,
    /// and a directory created concurrently by another process counts as
    /// success.
    pub fn ensure(&self) -> crate::Result<()> {
        if !self.root.exists() {
            create_dir(&self.root)?;
            tracing::debug!(path = %self.root.display(), "created storage root");
        }

        let gitignore = self.gitignore_path();
        if !gitignore.exists() {
            std::fs::write(&gitignore, GITIGNORE_CONTENT).map_err(|e| {
                crate::Error::StorageWrite {
                    path: gitignore.clone(),
                    source: e,
                }
            })?;
        }

        let logs = self.nginx_logs_dir();
        if !logs.exists() {
            create_dir(&logs)?;
        }

        Ok(())
    }
}

fn create_dir(path: &Path) -> crate::Result<()> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o777);
    }
    builder
        .create(path)
        .map_err(|e| crate::Error::StorageCreate {
            path: path.to_path_buf(),
            source: e,
        })
}
