use std::fmt;
use std::path::PathBuf;

use dockyard_build::StageError;
use dockyard_build::eject::EjectError;
use dockyard_engine::{ComposeError, EngineError, ImageError, PreflightError};

/// How an orchestrator operation ended when it did not fail.
#[derive(Debug)]
#[must_use]
pub enum Outcome<T> {
    Completed(T),
    /// The operator declined a confirmation. Nothing was left behind.
    Cancelled(Cancelled),
}

impl<T> Outcome<T> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    /// The completed value, if any.
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Cancelled(_) => None,
        }
    }
}

/// Which confirmation the operator declined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cancelled {
    BuildDeclined,
    DescriptorKept(PathBuf),
}

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BuildDeclined => f.write_str("production build declined"),
            Self::DescriptorKept(path) => {
                write!(f, "kept existing build descriptor {}", path.display())
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    // ── Pre-flight ──
    #[error("container engine is not available")]
    EngineUnavailable { source: PreflightError },

    #[error("{dir} is not a git repository; production builds stage files known to git")]
    VersionControlMissing { dir: PathBuf },

    #[error("`{command}` is not applicable in mercury mode")]
    NotApplicable { command: &'static str },

    #[error("another production build is running (lock held on {lock})")]
    BuildInProgress { lock: PathBuf },

    // ── Engine ──
    #[error("engine build failed for {tag}\n{output}")]
    EngineBuildFailed { tag: String, output: String },

    #[error("engine save failed for {tag}\n{output}")]
    EngineSaveFailed { tag: String, output: String },

    // ── Export destination ──
    #[error("export directory {path} does not exist")]
    ExportDirMissing { path: PathBuf },

    #[error("export path {path} is not a directory")]
    ExportDirNotADirectory { path: PathBuf },

    #[error("export directory {path} is not writable")]
    ExportDirNotWritable {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Wrapped ──
    #[error(transparent)]
    Config(#[from] dockyard_core::Error),

    #[error(transparent)]
    Stage(#[from] StageError),

    #[error(transparent)]
    Eject(#[from] EjectError),

    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error("failed to read the operator's answer")]
    Prompt { source: std::io::Error },

    #[error("I/O error on {path}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl PipelineError {
    /// True for refusals that are not failures of the operation itself.
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::NotApplicable { .. })
    }
}
