mod build_production;
mod doctor;
mod eject;
mod init;
mod stack;

use std::process::ExitCode;

pub use build_production::build_production;
pub use doctor::doctor;
pub use eject::eject;
pub use init::init_project;
pub use stack::{build, shell, start, stop};

/// How a command finished when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Success,
    /// The operator declined a confirmation.
    Aborted,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        match exit {
            Exit::Success => ExitCode::SUCCESS,
            Exit::Aborted => ExitCode::from(crate::EXIT_ABORTED),
        }
    }
}
