use std::path::Path;

use dockyard::config::CONFIG_FILE;

use super::Exit;

const CONFIG_TEMPLATE: &str = r#"[project]
# name = "my-app"
# mode = "standard"   # "mercury" disables start/stop/build/shell

[build]
# base_image = "php:8.3-fpm-alpine"
# workdir = "/var/www/html"
# extra_packages = []
# run = ["composer install --no-dev --optimize-autoloader"]
# port = 80

[env]
# source = ".env"

[env.production]
APP_ENV = "production"
APP_DEBUG = "false"

[compose]
# files = ["compose.yaml"]
# shell_service = "app"
# shell = "sh"

[engine]
# binary = "docker"

[storage]
# root = ".dockyard"
# export_dir = ".dockyard/images"
"#;

/// Initialize dockyard in an existing project.
pub fn init_project(project_dir: &Path) -> anyhow::Result<Exit> {
    let config_path = project_dir.join(CONFIG_FILE);
    if config_path.exists() {
        eprintln!("{CONFIG_FILE} already exists, skipping");
        return Ok(Exit::Success);
    }

    std::fs::write(&config_path, CONFIG_TEMPLATE)?;
    println!("Created {CONFIG_FILE}");

    println!();
    println!("Next steps:");
    println!();
    println!("  1. Review {CONFIG_FILE}");
    println!("  2. Start the development stack:");
    println!("     dockyard start");
    println!("  3. Build a production image:");
    println!("     dockyard build-production --export");

    Ok(Exit::Success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dockyard::DockyardConfig;

    #[test]
    fn template_parses_to_defaults() {
        let parsed: DockyardConfig = toml::from_str(CONFIG_TEMPLATE).unwrap();
        let defaults = DockyardConfig::default();

        assert_eq!(parsed.build.base_image, defaults.build.base_image);
        assert_eq!(parsed.env.production, defaults.env.production);
        assert_eq!(parsed.storage.root, defaults.storage.root);
    }
}
