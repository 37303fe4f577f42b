use std::path::{Path, PathBuf};

use dockyard_build::{DockerfileGenerator, eject, vcs};
use dockyard_core::config::CONFIG_FILE;
use dockyard_core::{
    Confirm, DockyardConfig, ProjectMeta, RuntimeMode, StdinPrompt, StorageLayout,
};
use dockyard_engine::{
    CheckResult, Composer, DoctorReport, EngineClient, EngineExecutor, RealExecutor,
    discover_compose_files,
};
use tokio::process::Child;

use crate::error::PipelineError;

/// Explicit handle for every lifecycle operation on one project.
///
/// Construction loads `dockyard.toml`, resolves the project and makes sure
/// the storage layout exists. The engine executor and the operator prompt
/// are injected so both can be replaced in tests.
pub struct Orchestrator<E: EngineExecutor = RealExecutor, P: Confirm = StdinPrompt> {
    pub(crate) config: DockyardConfig,
    pub(crate) project: ProjectMeta,
    pub(crate) storage: StorageLayout,
    pub(crate) engine: EngineClient<E>,
    pub(crate) prompt: P,
}

impl Orchestrator<RealExecutor, StdinPrompt> {
    /// Open the project at `project_dir` with the configured engine and stdin prompts.
    pub fn open(project_dir: &Path) -> Result<Self, PipelineError> {
        let config = DockyardConfig::load(project_dir)?;
        let executor = RealExecutor::new(config.engine.binary.clone());
        Self::with_parts(project_dir, config, executor, StdinPrompt)
    }
}

impl<E: EngineExecutor, P: Confirm> Orchestrator<E, P> {
    pub fn with_parts(
        project_dir: &Path,
        config: DockyardConfig,
        executor: E,
        prompt: P,
    ) -> Result<Self, PipelineError> {
        let project = ProjectMeta::discover(project_dir, &config)?;
        let storage = StorageLayout::new(config.storage_root(&project.root));
        storage.ensure()?;

        tracing::debug!(
            project = %project.name,
            root = %project.root.display(),
            storage = %storage.root().display(),
            "orchestrator ready"
        );

        Ok(Self {
            config,
            project,
            storage,
            engine: EngineClient::with_executor(executor),
            prompt,
        })
    }

    pub fn project(&self) -> &ProjectMeta {
        &self.project
    }

    pub fn config(&self) -> &DockyardConfig {
        &self.config
    }

    pub fn storage(&self) -> &StorageLayout {
        &self.storage
    }

    // ── Development stack ──

    /// `compose up -d`; returns the running engine process.
    pub async fn start(&self) -> Result<Child, PipelineError> {
        let composer = self.composer("start").await?;
        Ok(self.engine.spawn_compose(&composer.up(), false)?)
    }

    /// `compose down`; returns the running engine process.
    pub async fn stop(&self) -> Result<Child, PipelineError> {
        let composer = self.composer("stop").await?;
        Ok(self.engine.spawn_compose(&composer.down(), false)?)
    }

    /// Interactive shell in the configured service.
    pub async fn shell(&self) -> Result<Child, PipelineError> {
        let composer = self.composer("shell").await?;
        let command = composer.shell(&self.config.compose.shell_service, &self.config.compose.shell);
        Ok(self.engine.spawn_compose(&command, true)?)
    }

    /// Build the development images and wait for the engine to finish.
    pub async fn build(&self) -> Result<(), PipelineError> {
        let composer = self.composer("build").await?;
        self.engine.run_compose(&composer.build()).await?;
        Ok(())
    }

    async fn composer(&self, command: &'static str) -> Result<Composer, PipelineError> {
        self.ensure_applicable(command)?;
        self.engine
            .check_available()
            .await
            .map_err(|e| PipelineError::EngineUnavailable { source: e })?;

        let files = discover_compose_files(&self.project.root, &self.config.compose.files)?;
        Ok(Composer::new(
            self.engine.binary(),
            self.project.slug.clone(),
            files,
        ))
    }

    fn ensure_applicable(&self, command: &'static str) -> Result<(), PipelineError> {
        match self.config.runtime_mode()? {
            RuntimeMode::Standard => Ok(()),
            RuntimeMode::Mercury => {
                tracing::info!(command, "skipped in mercury mode");
                Err(PipelineError::NotApplicable { command })
            }
        }
    }

    // ── Build descriptor ──

    /// Descriptor used for production builds: the ejected copy if present.
    pub fn descriptor(&self) -> Result<String, PipelineError> {
        if eject::is_ejected(&self.project.root) {
            tracing::info!(
                path = %eject::ejected_path(&self.project.root).display(),
                "using ejected build descriptor"
            );
            Ok(eject::load_ejected_dockerfile(&self.project.root)?)
        } else {
            Ok(DockerfileGenerator::new(&self.config.build, &self.project).render())
        }
    }

    /// Write the rendered descriptor into the project for manual editing.
    pub fn eject(&self) -> Result<PathBuf, PipelineError> {
        let content = DockerfileGenerator::new(&self.config.build, &self.project).render();
        Ok(eject::eject(&self.project.root, &content)?)
    }

    // ── Diagnostics ──

    /// Every engine and project check, without stopping at the first failure.
    pub async fn doctor(&self) -> DoctorReport {
        let mut report = self.engine.doctor().await;
        let root = &self.project.root;

        report.git = if vcs::has_metadata(root) {
            CheckResult::ok("Found")
        } else {
            CheckResult::fail("Not a git repository")
        };

        report.config_file = if root.join(CONFIG_FILE).is_file() {
            CheckResult::ok("Found")
        } else {
            CheckResult::fail("Not found (defaults in use; run `dockyard init`)")
        };

        report.storage = if self.storage.nginx_logs_dir().is_dir() {
            CheckResult::ok(&self.storage.root().display().to_string())
        } else {
            CheckResult::fail("Storage layout incomplete")
        };

        report
    }
}
