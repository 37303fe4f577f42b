pub mod client;
pub mod compose;
pub mod error;
pub mod executor;

pub use client::{
    CheckResult, DoctorReport, EngineClient, EngineInfo, ImageError, PreflightError,
};
pub use compose::{ComposeCommand, ComposeError, Composer, discover_compose_files};
pub use error::EngineError;
pub use executor::{EngineExecutor, RealExecutor};
