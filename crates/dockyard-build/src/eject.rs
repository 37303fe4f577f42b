use std::path::{Path, PathBuf};

/// Directory, relative to the project, holding the ejected descriptor.
pub const EJECT_DIR: &str = "dockyard";

/// File name of the ejected descriptor.
pub const EJECTED_DOCKERFILE: &str = "Dockerfile.production";

pub fn ejected_path(project_dir: &Path) -> PathBuf {
    project_dir.join(EJECT_DIR).join(EJECTED_DOCKERFILE)
}

/// Ejects the production Dockerfile into the project directory.
///
/// After ejecting, `dockyard build-production` stages `dockyard/Dockerfile.production`
/// instead of generating one.
pub fn eject(project_dir: &Path, dockerfile_content: &str) -> Result<PathBuf, EjectError> {
    let eject_dir = project_dir.join(EJECT_DIR);
    std::fs::create_dir_all(&eject_dir).map_err(|e| EjectError::CreateDir {
        path: eject_dir.clone(),
        source: e,
    })?;

    let dockerfile_path = ejected_path(project_dir);
    if dockerfile_path.exists() {
        return Err(EjectError::AlreadyEjected(dockerfile_path));
    }

    std::fs::write(&dockerfile_path, dockerfile_content).map_err(|e| EjectError::Write {
        path: dockerfile_path.clone(),
        source: e,
    })?;

    Ok(dockerfile_path)
}

/// Check if the project has an ejected descriptor.
pub fn is_ejected(project_dir: &Path) -> bool {
    ejected_path(project_dir).exists()
}

/// Load ejected Dockerfile content.
pub fn load_ejected_dockerfile(project_dir: &Path) -> Result<String, EjectError> {
    let path = ejected_path(project_dir);
    std::fs::read_to_string(&path).map_err(|e| EjectError::Read { path, source: e })
}

#[derive(Debug, thiserror::Error)]
pub enum EjectError {
    #[error("failed to create directory {path}")]
    CreateDir {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("descriptor already ejected at {0}; edit it directly or delete it to re-eject")]
    AlreadyEjected(std::path::PathBuf),
    #[error("failed to write {path}")]
    Write {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("failed to read ejected Dockerfile at {path}")]
    Read {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
}
