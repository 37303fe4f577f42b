mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use dockyard::PipelineError;

/// Exit status for operator aborts: declined prompts and commands that do
/// not apply in the current runtime mode.
const EXIT_ABORTED: u8 = 3;

#[derive(Parser)]
#[command(
    name = "dockyard",
    about = "Run, build and export containerized PHP applications"
)]
#[command(version)]
struct Cli {
    /// Project directory
    #[arg(long, short = 'C', global = true, default_value = ".")]
    project_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the development stack
    Start,
    /// Stop the development stack
    Stop,
    /// Build the development images
    Build,
    /// Build a tagged production image, optionally exported as a .tar archive
    BuildProduction {
        /// Export the image without asking
        #[arg(long)]
        export: bool,
        /// Directory the archive is written to (default: [storage].export_dir)
        #[arg(long, value_name = "PATH")]
        export_dir: Option<PathBuf>,
        /// Skip confirmation prompts
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Open a shell in the application container
    Shell,
    /// Eject the production Dockerfile for manual customization
    Eject,
    /// Check engine and project setup
    Doctor,
    /// Write a dockyard.toml template
    Init,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(exit) => exit.into(),
        Err(e) => report(&e),
    }
}

async fn run(cli: Cli) -> anyhow::Result<commands::Exit> {
    let dir = cli.project_dir.as_path();

    match cli.command {
        Commands::Start => commands::start(dir).await,
        Commands::Stop => commands::stop(dir).await,
        Commands::Build => commands::build(dir).await,
        Commands::BuildProduction {
            export,
            export_dir,
            yes,
        } => commands::build_production(dir, export, export_dir, yes).await,
        Commands::Shell => commands::shell(dir).await,
        Commands::Eject => commands::eject(dir),
        Commands::Doctor => commands::doctor(dir).await,
        Commands::Init => commands::init_project(dir),
    }
}

fn report(error: &anyhow::Error) -> ExitCode {
    match error.downcast_ref::<PipelineError>() {
        Some(e) if e.is_abort() => {
            eprintln!("Aborted: {e}");
            ExitCode::from(EXIT_ABORTED)
        }
        _ => {
            eprintln!("Error: {error:?}");
            ExitCode::FAILURE
        }
    }
}
