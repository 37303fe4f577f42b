use std::path::PathBuf;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};

use crate::error::EngineError;

/// `tracing` target every streamed engine output line is emitted under.
pub const OUTPUT_TARGET: &str = "dockyard::engine";

/// Abstraction over container engine CLI execution for testability.
///
/// Production code uses [`RealExecutor`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait EngineExecutor: Send + Sync {
    /// Engine binary name, used in messages.
    fn binary(&self) -> &str;

    /// Resolve the engine binary on `PATH`.
    fn locate(&self) -> Result<PathBuf, EngineError>;

    /// Execute an engine command and capture stdout.
    async fn exec(&self, args: &[String]) -> Result<String, EngineError>;

    /// Execute an engine command, emitting every stdout and stderr line to
    /// `tracing` as it arrives. Returns the accumulated output.
    async fn exec_streaming(&self, args: &[String]) -> Result<String, EngineError>;

    /// Start a long-running engine command attached to the terminal and
    /// return without waiting. `interactive` also hands over stdin.
    fn spawn(&self, args: &[String], interactive: bool) -> Result<Child, EngineError>;
}

/// Real engine CLI executor.
pub struct RealExecutor {
    binary: String,
}

impl RealExecutor {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn spawn_error(&self, source: std::io::Error) -> EngineError {
        EngineError::Spawn {
            binary: self.binary.clone(),
            source,
        }
    }

    fn stream_error(&self, source: std::io::Error, output: String) -> EngineError {
        EngineError::Stream {
            binary: self.binary.clone(),
            source,
            output,
        }
    }

    /// Kill and reap a child whose output can no longer be read.
    async fn abandon(
        &self,
        child: &mut Child,
        source: std::io::Error,
        output: String,
    ) -> EngineError {
        if let Err(e) = child.kill().await {
            tracing::warn!(binary = %self.binary, error = %e, "failed to stop engine process");
        }
        self.stream_error(source, output)
    }
}

/// Engine output is not guaranteed to be UTF-8; decode lossily.
fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

impl Default for RealExecutor {
    fn default() -> Self {
        Self::new("docker")
    }
}

impl EngineExecutor for RealExecutor {
    fn binary(&self) -> &str {
        &self.binary
    }

    fn locate(&self) -> Result<PathBuf, EngineError> {
        which::which(&self.binary).map_err(|e| EngineError::NotInstalled {
            binary: self.binary.clone(),
            source: e,
        })
    }

    async fn exec(&self, args: &[String]) -> Result<String, EngineError> {
        let output = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if output.status.success() {
            String::from_utf8(output.stdout).map_err(|e| EngineError::InvalidUtf8 { source: e })
        } else {
            Err(EngineError::CommandFailed {
                args: args.to_vec(),
                status: output.status.to_string(),
                output: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
    }

    async fn exec_streaming(&self, args: &[String]) -> Result<String, EngineError> {
        let mut child = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            let source = std::io::Error::other("output pipes not captured");
            return Err(self.abandon(&mut child, source, String::new()).await);
        };

        let mut stdout = BufReader::new(stdout).split(b'\n');
        let mut stderr = BufReader::new(stderr).split(b'\n');
        let mut output = String::new();
        let (mut stdout_open, mut stderr_open) = (true, true);

        while stdout_open || stderr_open {
            let (segment, stream) = tokio::select! {
                segment = stdout.next_segment(), if stdout_open => (segment, "stdout"),
                segment = stderr.next_segment(), if stderr_open => (segment, "stderr"),
            };

            match segment {
                Ok(Some(bytes)) => {
                    let line = decode_line(&bytes);
                    tracing::info!(target: OUTPUT_TARGET, stream, "{line}");
                    output.push_str(&line);
                    output.push('\n');
                }
                Ok(None) if stream == "stdout" => stdout_open = false,
                Ok(None) => stderr_open = false,
                Err(e) => return Err(self.abandon(&mut child, e, output).await),
            }
        }

        let status = match child.wait().await {
            Ok(status) => status,
            Err(e) => return Err(self.stream_error(e, output)),
        };

        if status.success() {
            Ok(output)
        } else {
            Err(EngineError::CommandFailed {
                args: args.to_vec(),
                status: status.to_string(),
                output,
            })
        }
    }

    fn spawn(&self, args: &[String], interactive: bool) -> Result<Child, EngineError> {
        let stdin = if interactive {
            Stdio::inherit()
        } else {
            Stdio::null()
        };

        Command::new(&self.binary)
            .args(args)
            .stdin(stdin)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| self.spawn_error(e))
    }
}
