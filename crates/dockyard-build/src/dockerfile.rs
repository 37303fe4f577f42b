use std::path::{Path, PathBuf};

use dockyard_core::{BuildConfig, Confirm, ProjectMeta};

use crate::StageError;

/// Generates the production Dockerfile from `[build]` configuration.
pub struct DockerfileGenerator<'a> {
    config: &'a BuildConfig,
    meta: &'a ProjectMeta,
}

impl<'a> DockerfileGenerator<'a> {
    pub fn new(config: &'a BuildConfig, meta: &'a ProjectMeta) -> Self {
        Self { config, meta }
    }

    pub fn render(&self) -> String {
        let extra_packages = if self.config.extra_packages.is_empty() {
            String::new()
        } else {
            let packages = self.config.extra_packages.join(" ");
            if self.config.base_image.contains("alpine") {
                format!("RUN apk add --no-cache {packages}\n")
            } else {
                format!(
                    "RUN apt-get update && apt-get install -y {packages} && rm -rf /var/lib/apt/lists/*\n"
                )
            }
        };

        let mut env_keys: Vec<&String> = self.config.env.keys().collect();
        env_keys.sort();
        let env: String = env_keys
            .into_iter()
            .map(|key| format!("ENV {key}={}\n", json_string(&self.config.env[key])))
            .collect();

        let run: String = self
            .config
            .run
            .iter()
            .map(|cmd| format!("RUN {cmd}\n"))
            .collect();

        let command = match &self.config.command {
            Some(argv) => format!(
                "CMD [{}]\n",
                argv.iter()
                    .map(|arg| json_string(arg))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            None => String::new(),
        };

        format!(
            r#"# Production image for {name}, generated by dockyard.
FROM {base}
{extra_packages}WORKDIR {workdir}
{env}COPY . .
{run}EXPOSE {port}
{command}"#,
            name = self.meta.name,
            base = self.config.base_image,
            workdir = self.config.workdir,
            port = self.config.port,
        )
    }
}

/// What happened when writing the build descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorWrite {
    Written(PathBuf),
    /// A descriptor was already present and the operator kept it.
    Declined(PathBuf),
}

/// Write `content` to `dir/file_name`.
///
/// When a file is already there and `skip_confirmations` is false the
/// operator is asked before it is overwritten.
pub fn write_descriptor(
    dir: &Path,
    file_name: &str,
    content: &str,
    skip_confirmations: bool,
    prompt: &impl Confirm,
) -> Result<DescriptorWrite, StageError> {
    let path = dir.join(file_name);

    if path.exists() && !skip_confirmations {
        let question = format!("{file_name} already exists in the build context. Overwrite it?");
        let overwrite = prompt
            .confirm(&question)
            .map_err(|e| StageError::Prompt { source: e })?;
        if !overwrite {
            return Ok(DescriptorWrite::Declined(path));
        }
    }

    std::fs::write(&path, content).map_err(|e| StageError::Write {
        path: path.clone(),
        source: e,
    })?;
    Ok(DescriptorWrite::Written(path))
}

/// Double-quoted string as used in ENV values and exec-form CMD.
fn json_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
