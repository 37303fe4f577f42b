use std::path::{Path, PathBuf};

use dockyard::{BuildRequest, Orchestrator, Outcome};

use super::Exit;

/// Build the production image and optionally export it.
pub async fn build_production(
    project_dir: &Path,
    export: bool,
    export_dir: Option<PathBuf>,
    yes: bool,
) -> anyhow::Result<Exit> {
    let orchestrator = Orchestrator::open(project_dir)?;
    let request = BuildRequest {
        export,
        export_dir,
        skip_confirmations: yes,
    };

    match orchestrator.build_production(&request).await? {
        Outcome::Completed(report) => {
            println!();
            println!("Image built: {}", report.image_tag);
            if let Some(archive) = report.archive {
                println!("Exported to: {}", archive.display());
            }
            Ok(Exit::Success)
        }
        Outcome::Cancelled(reason) => {
            println!("Aborted: {reason}.");
            Ok(Exit::Aborted)
        }
    }
}
