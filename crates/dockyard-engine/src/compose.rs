//! Compose command composition.
//!
//! dockyard never interprets compose files; it only decides which ones to
//! pass with `-f` and builds the `<engine> compose ...` command line.

use std::fmt;
use std::path::{Path, PathBuf};

/// Compose files looked up in the project root, in priority order.
pub const COMPOSE_CANDIDATES: &[&str] = &[
    "compose.yaml",
    "compose.yml",
    "docker-compose.yaml",
    "docker-compose.yml",
];

/// Resolve the compose files for `project_dir`.
///
/// Explicitly configured files are used as given and must all exist.
/// Otherwise the first existing candidate is used, followed by its
/// `.override` sibling when there is one.
pub fn discover_compose_files(
    project_dir: &Path,
    configured: &[PathBuf],
) -> Result<Vec<PathBuf>, ComposeError> {
    if !configured.is_empty() {
        return configured
            .iter()
            .map(|file| {
                let path = project_dir.join(file);
                if path.is_file() {
                    Ok(path)
                } else {
                    Err(ComposeError::ComposeFileMissing(path))
                }
            })
            .collect();
    }

    let Some(primary) = COMPOSE_CANDIDATES
        .iter()
        .map(|name| project_dir.join(name))
        .find(|path| path.is_file())
    else {
        return Err(ComposeError::NoComposeFile {
            dir: project_dir.to_path_buf(),
        });
    };

    let mut files = vec![primary.clone()];
    if let Some(override_file) = override_sibling(&primary).filter(|p| p.is_file()) {
        files.push(override_file);
    }

    tracing::debug!(files = ?files, "compose files discovered");
    Ok(files)
}

/// `compose.yaml` -> `compose.override.yaml`
fn override_sibling(path: &Path) -> Option<PathBuf> {
    let stem = path.file_stem()?.to_str()?;
    let ext = path.extension()?.to_str()?;
    Some(path.with_file_name(format!("{stem}.override.{ext}")))
}

/// Builds compose command lines for one project.
#[derive(Debug, Clone)]
pub struct Composer {
    binary: String,
    project_name: String,
    files: Vec<PathBuf>,
}

impl Composer {
    pub fn new(binary: impl Into<String>, project_name: impl Into<String>, files: Vec<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            project_name: project_name.into(),
            files,
        }
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Start the stack in the background.
    pub fn up(&self) -> ComposeCommand {
        self.command(&["up", "-d", "--remove-orphans"])
    }

    /// Stop and remove the stack's containers.
    pub fn down(&self) -> ComposeCommand {
        self.command(&["down"])
    }

    /// Build the development images.
    pub fn build(&self) -> ComposeCommand {
        self.command(&["build"])
    }

    /// Open `shell` inside `service`.
    pub fn shell(&self, service: &str, shell: &str) -> ComposeCommand {
        self.command(&["exec", service, shell])
    }

    fn command(&self, action: &[&str]) -> ComposeCommand {
        let mut args = vec![
            "compose".to_owned(),
            "-p".to_owned(),
            self.project_name.clone(),
        ];
        for file in &self.files {
            args.push("-f".to_owned());
            args.push(file.to_string_lossy().into_owned());
        }
        args.extend(action.iter().map(|a| (*a).to_owned()));

        ComposeCommand {
            program: self.binary.clone(),
            args,
        }
    }
}

/// A composed engine invocation. `Display` renders it as a shell command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeCommand {
    program: String,
    args: Vec<String>,
}

impl ComposeCommand {
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments passed to the engine binary.
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for ComposeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&shell_quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", shell_quote(arg))?;
        }
        Ok(())
    }
}

fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c));
    if safe {
        arg.to_owned()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error(
        "no compose file found in {dir}; expected one of {}",
        COMPOSE_CANDIDATES.join(", ")
    )]
    NoComposeFile { dir: PathBuf },

    #[error("configured compose file {0} does not exist")]
    ComposeFileMissing(PathBuf),
}
