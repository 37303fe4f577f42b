use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load config from {path}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid runtime mode {value:?}; expected \"standard\" or \"mercury\"")]
    InvalidMode { value: String },

    // ── Project discovery ──
    #[error("failed to resolve project directory {path}")]
    ProjectDirResolve {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(
        "application name {name:?} has no characters usable in an image tag; set [project].name in dockyard.toml"
    )]
    InvalidAppName { name: String },

    // ── Storage ──
    #[error("failed to create storage directory {path}")]
    StorageCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}")]
    StorageWrite {
        path: PathBuf,
        source: std::io::Error,
    },
}
