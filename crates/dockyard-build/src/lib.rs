//! Build context staging for dockyard production images.
//!
//! # Staging
//!
//! ```text
//! dockyard build-production
//!   1. Lock        ── BuildLock on <storage>/build.lock
//!   2. Context     ── TempContext under <storage>/tmp/dockyard-build-XXXXXX
//!   3. Sources     ── git ls-files → context
//!   4. Env file    ── EnvFileGenerator (.env + [env.production])
//!   5. Descriptor  ── ejected dockyard/Dockerfile.production or DockerfileGenerator
//! ```
//!
//! The context mirrors the git working tree: tracked files plus untracked
//! files that are not ignored. `.git/` and the storage root are never copied.

pub mod context;
pub mod dockerfile;
pub mod eject;
pub mod envfile;
pub mod error;
pub mod lock;
pub mod vcs;

pub use context::TempContext;
pub use dockerfile::{DescriptorWrite, DockerfileGenerator, write_descriptor};
pub use envfile::EnvFileGenerator;
pub use error::StageError;
pub use lock::BuildLock;
