use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("failed to create directory {path}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to create temp build context under {path}")]
    CreateTemp {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to remove temp build context {path}")]
    RemoveTemp {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to copy file {path}")]
    CopyFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to read env file {path}")]
    EnvParse {
        path: PathBuf,
        source: dotenvy::Error,
    },
    #[error("failed to read confirmation")]
    Prompt { source: std::io::Error },
    #[error("failed to open build lock {path}")]
    Lock {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("another build is already running (lock held on {path})")]
    Locked { path: PathBuf },
    #[error("git command failed: {detail}")]
    GitCommand {
        detail: String,
        source: std::io::Error,
    },
    #[error("git failed: {detail}")]
    GitFailed { detail: String },
}
