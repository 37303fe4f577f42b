use std::path::Path;

use dockyard::Orchestrator;
use tokio::process::Child;

use super::Exit;

pub async fn start(project_dir: &Path) -> anyhow::Result<Exit> {
    let orchestrator = Orchestrator::open(project_dir)?;
    println!("Starting {}...", orchestrator.project().name);
    wait(orchestrator.start().await?, "start").await
}

pub async fn stop(project_dir: &Path) -> anyhow::Result<Exit> {
    let orchestrator = Orchestrator::open(project_dir)?;
    println!("Stopping {}...", orchestrator.project().name);
    wait(orchestrator.stop().await?, "stop").await
}

pub async fn shell(project_dir: &Path) -> anyhow::Result<Exit> {
    let orchestrator = Orchestrator::open(project_dir)?;
    wait(orchestrator.shell().await?, "shell").await
}

pub async fn build(project_dir: &Path) -> anyhow::Result<Exit> {
    let orchestrator = Orchestrator::open(project_dir)?;
    println!("Building development images...");
    orchestrator.build().await?;
    println!("Done.");
    Ok(Exit::Success)
}

async fn wait(mut child: Child, command: &str) -> anyhow::Result<Exit> {
    let status = child.wait().await?;
    tracing::debug!(command, %status, "engine process exited");
    if !status.success() {
        anyhow::bail!("`{command}` failed: container engine exited with {status}");
    }
    Ok(Exit::Success)
}
