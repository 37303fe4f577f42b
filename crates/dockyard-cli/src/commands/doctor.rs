use std::path::Path;

use dockyard::Orchestrator;

use super::Exit;

pub async fn doctor(project_dir: &Path) -> anyhow::Result<Exit> {
    let orchestrator = Orchestrator::open(project_dir)?;
    let report = orchestrator.doctor().await;

    println!();
    println!("{report}");

    if !report.all_passed() {
        anyhow::bail!("some checks failed, see above for details");
    }

    Ok(Exit::Success)
}
