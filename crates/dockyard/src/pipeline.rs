//! Production build and export.
//!
//! ```text
//! build_production
//!   PreFlight ── engine, .git, confirm
//!   Staging   ── lock, temp context, sources, .env, descriptor
//!   Tagged    ── <app>:<YYYY-MM-DD_HH-MM-SS>, computed once
//!   Building  ── <engine> build --file <ctx>/<descriptor> --tag <tag> <ctx>
//!   Exporting ── validate export dir, <engine> save --output <dir>/<tag>.tar
//! ```
//!
//! The temp context is removed on every exit path once it exists.

use std::path::{Path, PathBuf};

use dockyard_build::{
    BuildLock, DescriptorWrite, EnvFileGenerator, StageError, TempContext, write_descriptor,
};
use dockyard_core::{Confirm, ImageTag};
use dockyard_engine::{EngineExecutor, ImageError};

use crate::error::{Cancelled, Outcome, PipelineError};
use crate::export;
use crate::orchestrator::Orchestrator;
use crate::preflight::PreFlight;

/// Archive extension for exported images.
pub const ARCHIVE_EXTENSION: &str = "tar";

/// Inputs of one production build. Not modified during the run.
#[derive(Debug, Clone, Default)]
pub struct BuildRequest {
    pub export: bool,
    /// Destination for the archive; the configured export root when `None`.
    pub export_dir: Option<PathBuf>,
    pub skip_confirmations: bool,
}

#[derive(Debug, Clone)]
pub struct BuildReport {
    pub image_tag: ImageTag,
    /// Absolute path of the exported archive, when one was written.
    pub archive: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    PreFlight,
    Staging,
    Tagged,
    Building,
    Exporting,
    Done,
    Failed,
    Cancelled,
}

/// State owned by a single `build_production` call.
#[derive(Debug)]
struct BuildSession {
    phase: Phase,
    image_tag: Option<ImageTag>,
}

impl BuildSession {
    fn new() -> Self {
        Self {
            phase: Phase::Idle,
            image_tag: None,
        }
    }

    fn advance(&mut self, next: Phase) {
        tracing::debug!(from = ?self.phase, to = ?next, "build phase");
        self.phase = next;
    }

    /// The session's tag; computed on first call and fixed afterwards.
    fn tag(&mut self, app_slug: &str) -> ImageTag {
        self.image_tag
            .get_or_insert_with(|| ImageTag::now(app_slug))
            .clone()
    }
}

impl<E: EngineExecutor, P: Confirm> Orchestrator<E, P> {
    /// Build a production image and optionally export it as an archive.
    pub async fn build_production(
        &self,
        request: &BuildRequest,
    ) -> Result<Outcome<BuildReport>, PipelineError> {
        let mut session = BuildSession::new();
        let result = self.run_session(&mut session, request).await;

        match &result {
            Ok(Outcome::Completed(report)) => {
                session.advance(Phase::Done);
                tracing::info!(tag = %report.image_tag, "production build finished");
            }
            Ok(Outcome::Cancelled(reason)) => {
                session.advance(Phase::Cancelled);
                tracing::info!(%reason, "production build cancelled");
            }
            Err(e) => {
                session.advance(Phase::Failed);
                tracing::debug!(error = %e, "production build failed");
            }
        }

        result
    }

    async fn run_session(
        &self,
        session: &mut BuildSession,
        request: &BuildRequest,
    ) -> Result<Outcome<BuildReport>, PipelineError> {
        session.advance(Phase::PreFlight);
        let preflight = PreFlight::new(&self.engine, &self.project, &self.prompt);
        if let Outcome::Cancelled(reason) = preflight.run(request.skip_confirmations).await? {
            return Ok(Outcome::Cancelled(reason));
        }

        session.advance(Phase::Staging);
        let _lock = BuildLock::acquire(&self.storage.lock_path()).map_err(|e| match e {
            StageError::Locked { path } => PipelineError::BuildInProgress { lock: path },
            other => PipelineError::Stage(other),
        })?;

        let context = TempContext::create(&self.storage.tmp_dir())?;
        let root = &self.project.root;

        let staged = context.stage_sources(root, &self.staging_excludes())?;
        tracing::info!(files = staged, context = %context.path().display(), "sources staged");

        EnvFileGenerator::new(&self.config.env, root).write_into(context.path())?;

        let descriptor = self.descriptor()?;
        let dockerfile = match write_descriptor(
            context.path(),
            &self.config.build.dockerfile,
            &descriptor,
            request.skip_confirmations,
            &self.prompt,
        )? {
            DescriptorWrite::Written(path) => path,
            DescriptorWrite::Declined(path) => {
                context.remove()?;
                return Ok(Outcome::Cancelled(Cancelled::DescriptorKept(path)));
            }
        };

        let image_tag = session.tag(&self.project.slug);
        session.advance(Phase::Tagged);
        tracing::info!(tag = %image_tag, "building production image");

        session.advance(Phase::Building);
        let built = self
            .engine
            .build_image(context.path(), &dockerfile, &image_tag)
            .await;

        match (built, context.remove()) {
            (Ok(_), removed) => removed?,
            (Err(e), Ok(())) => return Err(build_failure(e)),
            (Err(e), Err(cleanup)) => {
                // the build error is returned, the leftover context only logged
                tracing::error!(
                    error = ?cleanup,
                    "temp build context left behind after failed build"
                );
                return Err(build_failure(e));
            }
        }

        if !self.export_requested(request, &image_tag)? {
            return Ok(Outcome::Completed(BuildReport {
                image_tag,
                archive: None,
            }));
        }

        session.advance(Phase::Exporting);
        let archive = self.export(request, &image_tag).await?;

        Ok(Outcome::Completed(BuildReport {
            image_tag,
            archive: Some(archive),
        }))
    }

    fn export_requested(
        &self,
        request: &BuildRequest,
        image_tag: &ImageTag,
    ) -> Result<bool, PipelineError> {
        if request.export {
            return Ok(true);
        }
        if request.skip_confirmations {
            return Ok(false);
        }

        let question = format!("Export {image_tag} as a .{ARCHIVE_EXTENSION} archive?");
        self.prompt
            .confirm(&question)
            .map_err(|e| PipelineError::Prompt { source: e })
    }

    async fn export(
        &self,
        request: &BuildRequest,
        image_tag: &ImageTag,
    ) -> Result<PathBuf, PipelineError> {
        let export_root = self.config.export_root(&self.project.root);
        export::ensure_export_root(&export_root)?;

        let requested = request.export_dir.as_deref().unwrap_or(export_root.as_path());
        let dir = export::validate_export_dir(requested)?;
        let archive = dir.join(image_tag.archive_file_name(ARCHIVE_EXTENSION));

        tracing::info!(archive = %archive.display(), "exporting image");
        match self.engine.save_image(image_tag, &archive).await {
            Ok(_) => Ok(archive),
            Err(ImageError::Save { tag, source }) => Err(PipelineError::EngineSaveFailed {
                tag,
                output: source.output().to_owned(),
            }),
            Err(other) => Err(other.into()),
        }
    }

    /// Project-relative paths never copied into a build context.
    fn staging_excludes(&self) -> Vec<PathBuf> {
        let root = &self.project.root;
        let export_root = self.config.export_root(root);
        [self.storage.root(), export_root.as_path()]
            .into_iter()
            .filter_map(|path| relative_to(path, root))
            .collect()
    }
}

fn build_failure(e: ImageError) -> PipelineError {
    match e {
        ImageError::Build { tag, source } => PipelineError::EngineBuildFailed {
            tag,
            output: source.output().to_owned(),
        },
        other => other.into(),
    }
}

fn relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    if path == base || !path.starts_with(base) {
        return None;
    }
    Some(path.components().skip(base.components().count()).collect())
}
