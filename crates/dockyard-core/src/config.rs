use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Name of the project configuration file.
pub const CONFIG_FILE: &str = "dockyard.toml";

/// Environment variable that forces the runtime mode, overriding `[project].mode`.
pub const MODE_ENV_VAR: &str = "DOCKYARD_MODE";

/// dockyard.toml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DockyardConfig {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub env: EnvConfig,
    #[serde(default)]
    pub compose: ComposeConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Where the orchestrator is running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
    /// Plain local environment; every lifecycle command is available.
    #[default]
    Standard,
    /// Nested/managed environment. Start, stop, build and shell are inapplicable.
    Mercury,
}

impl RuntimeMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "standard" => Some(Self::Standard),
            "mercury" => Some(Self::Mercury),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Application name (defaults to the project directory name)
    pub name: Option<String>,
    #[serde(default)]
    pub mode: RuntimeMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Base image of the production image
    #[serde(default = "default_base_image")]
    pub base_image: String,
    /// Working directory inside the image
    #[serde(default = "default_workdir")]
    pub workdir: String,
    /// Additional system packages installed via apk
    #[serde(default)]
    pub extra_packages: Vec<String>,
    /// Commands run after the sources are copied (one RUN each)
    #[serde(default)]
    pub run: Vec<String>,
    /// Static environment variables baked into the image as ENV directives
    #[serde(default)]
    pub env: HashMap<String, String>,
    /// Port exposed by the image
    #[serde(default = "default_port")]
    pub port: u16,
    /// Container command; the base image default is kept when unset
    #[serde(default)]
    pub command: Option<Vec<String>>,
    /// File name of the generated build descriptor
    #[serde(default = "default_dockerfile")]
    pub dockerfile: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvConfig {
    /// Development env file the production file is derived from
    #[serde(default = "default_env_source")]
    pub source: PathBuf,
    /// Values forced in the production env file
    #[serde(default = "default_production_env")]
    pub production: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposeConfig {
    /// Compose files passed with `-f`, in order. Discovered when empty.
    #[serde(default)]
    pub files: Vec<PathBuf>,
    /// Service `dockyard shell` attaches to
    #[serde(default = "default_shell_service")]
    pub shell_service: String,
    /// Shell started inside the service
    #[serde(default = "default_shell")]
    pub shell: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Container engine binary
    #[serde(default = "default_engine_binary")]
    pub binary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Persistent storage root, relative to the project directory
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
    /// Default destination of exported image archives
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            base_image: default_base_image(),
            workdir: default_workdir(),
            extra_packages: Vec::new(),
            run: Vec::new(),
            env: HashMap::new(),
            port: default_port(),
            command: None,
            dockerfile: default_dockerfile(),
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            source: default_env_source(),
            production: default_production_env(),
        }
    }
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            shell_service: default_shell_service(),
            shell: default_shell(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary: default_engine_binary(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
            export_dir: default_export_dir(),
        }
    }
}

impl DockyardConfig {
    /// Load from dockyard.toml at the given path, or return defaults if not found.
    pub fn load(project_dir: &Path) -> crate::Result<Self> {
        let config_path = project_dir.join(CONFIG_FILE);
        if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).map_err(|e| crate::Error::ConfigLoad {
                    path: config_path.clone(),
                    source: e,
                })?;
            toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
                path: config_path,
                source: e,
            })
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Effective runtime mode: `DOCKYARD_MODE` wins over the config file.
    pub fn runtime_mode(&self) -> crate::Result<RuntimeMode> {
        match std::env::var(MODE_ENV_VAR) {
            Ok(value) => RuntimeMode::parse(&value).ok_or(crate::Error::InvalidMode { value }),
            Err(std::env::VarError::NotPresent) => Ok(self.project.mode),
            Err(std::env::VarError::NotUnicode(raw)) => Err(crate::Error::InvalidMode {
                value: raw.to_string_lossy().into_owned(),
            }),
        }
    }

    /// Storage root resolved against the project directory.
    pub fn storage_root(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.storage.root)
    }

    /// Export root resolved against the project directory.
    pub fn export_root(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.storage.export_dir)
    }
}

fn default_base_image() -> String {
    "php:8.3-fpm-alpine".to_owned()
}

fn default_workdir() -> String {
    "/var/www/html".to_owned()
}

fn default_port() -> u16 {
    80
}

fn default_dockerfile() -> String {
    "Dockerfile.production".to_owned()
}

fn default_env_source() -> PathBuf {
    PathBuf::from(".env")
}

fn default_production_env() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("APP_DEBUG".to_owned(), "false".to_owned()),
        ("APP_ENV".to_owned(), "production".to_owned()),
    ])
}

fn default_shell_service() -> String {
    "app".to_owned()
}

fn default_shell() -> String {
    "sh".to_owned()
}

fn default_engine_binary() -> String {
    "docker".to_owned()
}

fn default_storage_root() -> PathBuf {
    PathBuf::from(".dockyard")
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(".dockyard/images")
}
