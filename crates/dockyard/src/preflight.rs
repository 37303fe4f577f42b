use dockyard_build::vcs;
use dockyard_core::{Confirm, ProjectMeta};
use dockyard_engine::{EngineClient, EngineExecutor, EngineInfo};

use crate::error::{Cancelled, Outcome, PipelineError};

/// Checks run before anything is written for a production build.
///
/// Has no side effects on failure or cancellation.
pub struct PreFlight<'a, E: EngineExecutor, P: Confirm> {
    engine: &'a EngineClient<E>,
    project: &'a ProjectMeta,
    prompt: &'a P,
}

impl<'a, E: EngineExecutor, P: Confirm> PreFlight<'a, E, P> {
    pub fn new(engine: &'a EngineClient<E>, project: &'a ProjectMeta, prompt: &'a P) -> Self {
        Self {
            engine,
            project,
            prompt,
        }
    }

    pub async fn run(&self, skip_confirmations: bool) -> Result<Outcome<EngineInfo>, PipelineError> {
        let info = self
            .engine
            .check_available()
            .await
            .map_err(|e| PipelineError::EngineUnavailable { source: e })?;

        if !vcs::has_metadata(&self.project.root) {
            return Err(PipelineError::VersionControlMissing {
                dir: self.project.root.clone(),
            });
        }

        match vcs::is_dirty(&self.project.root) {
            Ok(true) => tracing::warn!(
                "working tree has uncommitted changes; they will be included in the image"
            ),
            Ok(false) => {}
            Err(e) => tracing::warn!(error = %e, "could not determine working tree state"),
        }

        if !skip_confirmations {
            let question = format!("Build a production image for {}?", self.project.name);
            let proceed = self
                .prompt
                .confirm(&question)
                .map_err(|e| PipelineError::Prompt { source: e })?;
            if !proceed {
                tracing::info!("production build declined");
                return Ok(Outcome::Cancelled(Cancelled::BuildDeclined));
            }
        }

        Ok(Outcome::Completed(info))
    }
}
