//! Core types and configuration for dockyard.
//!
//! This crate defines the `dockyard.toml` schema ([`DockyardConfig`]),
//! project discovery ([`ProjectMeta`]), the persistent storage layout
//! ([`StorageLayout`]), image tags ([`ImageTag`]), operator prompts
//! ([`Confirm`]) and shared error types.

pub mod config;
pub mod error;
pub mod project;
pub mod prompt;
pub mod storage;
pub mod tag;

pub use config::{
    BuildConfig, ComposeConfig, DockyardConfig, EngineConfig, EnvConfig, ProjectConfig,
    RuntimeMode, StorageConfig,
};
pub use error::{Error, Result};
pub use project::ProjectMeta;
pub use prompt::{Confirm, StdinPrompt};
pub use storage::StorageLayout;
pub use tag::ImageTag;
