//! Local container lifecycle orchestration for PHP applications.
//!
//! This is the facade crate: it owns the [`Orchestrator`] and the production
//! build pipeline, and re-exports the dockyard sub-crates.
//!
//! | Module | Crate | Description |
//! |--------|-------|-------------|
//! | root | `dockyard-core` | Configuration, project discovery, storage, tags |
//! | [`build`] | `dockyard-build` | Temp context staging, `.env`, Dockerfile, eject |
//! | [`engine`] | `dockyard-engine` | Container engine and compose invocation |
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use dockyard::{BuildRequest, Orchestrator, Outcome};
//!
//! # async fn run() -> Result<(), dockyard::PipelineError> {
//! let orchestrator = Orchestrator::open(Path::new("."))?;
//! let request = BuildRequest {
//!     export: true,
//!     ..BuildRequest::default()
//! };
//! if let Outcome::Completed(report) = orchestrator.build_production(&request).await? {
//!     println!("built {}", report.image_tag);
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod export;
pub mod orchestrator;
pub mod pipeline;
pub mod preflight;

pub use dockyard_core::*;

/// Build context staging, `.env` and Dockerfile generation, eject.
pub mod build {
    pub use dockyard_build::*;
}

/// Container engine and compose operations.
pub mod engine {
    pub use dockyard_engine::*;
}

pub use error::{Cancelled, Outcome, PipelineError};
pub use orchestrator::Orchestrator;
pub use pipeline::{BuildReport, BuildRequest, Phase};
pub use preflight::PreFlight;
