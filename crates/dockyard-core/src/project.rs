use std::path::{Path, PathBuf};

use crate::DockyardConfig;
use crate::tag::normalize_app_name;

/// The application dockyard manages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectMeta {
    /// Application name as configured (or the directory name)
    pub name: String,
    /// `name` normalized for image tags and compose project names
    pub slug: String,
    /// Absolute project directory
    pub root: PathBuf,
}

impl ProjectMeta {
    /// Resolve the project at `project_dir`.
    ///
    /// The name comes from `[project].name`, falling back to the final
    /// component of the canonical project directory.
    pub fn discover(project_dir: &Path, config: &DockyardConfig) -> crate::Result<Self> {
        let root = project_dir
            .canonicalize()
            .map_err(|e| crate::Error::ProjectDirResolve {
                path: project_dir.to_path_buf(),
                source: e,
            })?;

        let name = match config.project.name.as_deref() {
            Some(name) => name.to_owned(),
            None => match root.file_name() {
                Some(dir_name) => dir_name.to_string_lossy().into_owned(),
                None => String::new(),
            },
        };

        Self::new(name, root)
    }

    pub fn new(name: impl Into<String>, root: PathBuf) -> crate::Result<Self> {
        let name = name.into();
        let slug = normalize_app_name(&name);
        if slug.is_empty() {
            return Err(crate::Error::InvalidAppName { name });
        }

        tracing::debug!(%name, %slug, root = %root.display(), "project resolved");

        Ok(Self { name, slug, root })
    }
}
