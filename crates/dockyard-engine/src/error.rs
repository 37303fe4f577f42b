#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("container engine `{binary}` not found on PATH")]
    NotInstalled {
        binary: String,
        source: which::Error,
    },

    #[error("failed to start `{binary}`")]
    Spawn {
        binary: String,
        source: std::io::Error,
    },

    #[error("`{binary}` failed while streaming output")]
    Stream {
        binary: String,
        source: std::io::Error,
        output: String,
    },

    #[error("engine command failed ({status}): {args:?}\n{output}")]
    CommandFailed {
        args: Vec<String>,
        status: String,
        output: String,
    },

    #[error("engine output was not valid UTF-8")]
    InvalidUtf8 { source: std::string::FromUtf8Error },
}

impl EngineError {
    /// Output captured before the failure, empty when the command never ran.
    pub fn output(&self) -> &str {
        match self {
            Self::CommandFailed { output, .. } | Self::Stream { output, .. } => output,
            _ => "",
        }
    }
}
