use std::fmt;
use std::path::{Path, PathBuf};

use dockyard_core::ImageTag;
use tokio::process::Child;

use crate::compose::ComposeCommand;
use crate::error::EngineError;
use crate::executor::{EngineExecutor, RealExecutor};

/// Container engine operations, parameterized over the executor for testability.
pub struct EngineClient<E: EngineExecutor = RealExecutor> {
    executor: E,
}

impl EngineClient<RealExecutor> {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            executor: RealExecutor::new(binary),
        }
    }
}

impl Default for EngineClient<RealExecutor> {
    fn default() -> Self {
        Self::with_executor(RealExecutor::default())
    }
}

impl<E: EngineExecutor> EngineClient<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    pub fn binary(&self) -> &str {
        self.executor.binary()
    }

    // ── Preflight ──

    /// Verify the engine is installed and answers.
    pub async fn check_available(&self) -> Result<EngineInfo, PreflightError> {
        let path = self
            .executor
            .locate()
            .map_err(|e| PreflightError::NotInstalled { source: e })?;

        let version = self
            .executor
            .exec(&args(["--version"]))
            .await
            .map_err(|e| PreflightError::NotResponding {
                binary: self.binary().to_owned(),
                source: e,
            })?;

        let info = EngineInfo {
            path,
            version: version.trim().to_owned(),
        };
        tracing::debug!(path = %info.path.display(), version = %info.version, "engine available");
        Ok(info)
    }

    // ── Doctor ──

    /// Run all engine diagnostics without early return.
    pub async fn doctor(&self) -> DoctorReport {
        let mut report = DoctorReport::default();

        match self.executor.locate() {
            Ok(path) => report.engine = CheckResult::ok(&path.display().to_string()),
            Err(e) => report.engine = CheckResult::fail(&e.to_string()),
        }

        match self.executor.exec(&args(["--version"])).await {
            Ok(v) => report.engine_version = CheckResult::ok(v.trim()),
            Err(e) => report.engine_version = CheckResult::fail(&e.to_string()),
        }

        match self
            .executor
            .exec(&args(["compose", "version", "--short"]))
            .await
        {
            Ok(v) => report.compose = CheckResult::ok(v.trim()),
            Err(e) => {
                report.compose = CheckResult::fail(&format!("compose plugin not available ({e})"));
            }
        }

        report
    }

    // ── Images ──

    /// Build `tag` from the staged `context`, streaming engine output.
    pub async fn build_image(
        &self,
        context: &Path,
        dockerfile: &Path,
        tag: &ImageTag,
    ) -> Result<String, ImageError> {
        let context_str = utf8(context)?;
        let dockerfile_str = utf8(dockerfile)?;
        let tag_str = tag.to_string();

        self.executor
            .exec_streaming(&args([
                "build",
                "--file",
                dockerfile_str,
                "--tag",
                &tag_str,
                context_str,
            ]))
            .await
            .map_err(|e| ImageError::Build {
                tag: tag_str.clone(),
                source: e,
            })
    }

    /// Save `tag` as an archive at `archive`, streaming engine output.
    pub async fn save_image(&self, tag: &ImageTag, archive: &Path) -> Result<String, ImageError> {
        let archive_str = utf8(archive)?;
        let tag_str = tag.to_string();

        self.executor
            .exec_streaming(&args(["save", "--output", archive_str, &tag_str]))
            .await
            .map_err(|e| ImageError::Save {
                tag: tag_str.clone(),
                source: e,
            })
    }

    // ── Compose ──

    /// Run a compose command to completion, streaming its output.
    pub async fn run_compose(&self, command: &ComposeCommand) -> Result<String, EngineError> {
        tracing::info!(command = %command, "running");
        self.executor.exec_streaming(command.args()).await
    }

    /// Start a compose command and hand back the child process.
    pub fn spawn_compose(
        &self,
        command: &ComposeCommand,
        interactive: bool,
    ) -> Result<Child, EngineError> {
        tracing::info!(command = %command, "starting");
        self.executor.spawn(command.args(), interactive)
    }
}

// ── Helper ──

fn args<const N: usize>(a: [&str; N]) -> Vec<String> {
    a.iter().map(|s| (*s).to_owned()).collect()
}

fn utf8(path: &Path) -> Result<&str, ImageError> {
    path.to_str()
        .ok_or_else(|| ImageError::InvalidPath(path.to_path_buf()))
}

// ── Preflight types ──

#[derive(Debug, Clone)]
pub struct EngineInfo {
    pub path: PathBuf,
    pub version: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PreflightError {
    #[error("container engine not installed")]
    NotInstalled { source: EngineError },

    #[error("container engine `{binary}` is installed but not responding")]
    NotResponding { binary: String, source: EngineError },
}

// ── Doctor types ──

#[derive(Debug, Default)]
pub struct DoctorReport {
    pub engine: CheckResult,
    pub engine_version: CheckResult,
    pub compose: CheckResult,
    pub git: CheckResult,
    pub config_file: CheckResult,
    pub storage: CheckResult,
}

impl DoctorReport {
    pub fn all_passed(&self) -> bool {
        self.checks().iter().all(|(_, check)| check.passed)
    }

    fn checks(&self) -> [(&'static str, &CheckResult); 6] {
        [
            ("Engine binary", &self.engine),
            ("Engine version", &self.engine_version),
            ("Compose plugin", &self.compose),
            ("Git repository", &self.git),
            ("Config file", &self.config_file),
            ("Storage root", &self.storage),
        ]
    }
}

impl fmt::Display for DoctorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, check) in self.checks() {
            writeln!(f, "  [{}] {label:<16} {}", check.icon(), check.detail)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct CheckResult {
    pub passed: bool,
    pub detail: String,
}

impl CheckResult {
    pub fn ok(detail: &str) -> Self {
        Self {
            passed: true,
            detail: detail.to_owned(),
        }
    }

    pub fn fail(detail: &str) -> Self {
        Self {
            passed: false,
            detail: detail.to_owned(),
        }
    }

    pub fn icon(&self) -> &'static str {
        if self.passed { "OK" } else { "NG" }
    }
}

// ── Error types ──

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("path is not valid UTF-8: {0}")]
    InvalidPath(PathBuf),

    #[error("image build failed for {tag}")]
    Build { tag: String, source: EngineError },

    #[error("image save failed for {tag}")]
    Save { tag: String, source: EngineError },
}
