use std::path::Path;

use dockyard::Orchestrator;

use super::Exit;

pub fn eject(project_dir: &Path) -> anyhow::Result<Exit> {
    let orchestrator = Orchestrator::open(project_dir)?;
    let path = orchestrator.eject()?;

    println!("Ejected build descriptor to {}", path.display());
    println!("You can now edit it directly. dockyard build-production will use this file.");
    Ok(Exit::Success)
}
