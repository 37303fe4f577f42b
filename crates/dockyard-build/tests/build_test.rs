use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::process::Command;

use dockyard_build::dockerfile::{DescriptorWrite, DockerfileGenerator, write_descriptor};
use dockyard_build::eject::{eject, ejected_path, is_ejected, load_ejected_dockerfile};
use dockyard_build::envfile::EnvFileGenerator;
use dockyard_build::vcs::{has_metadata, is_dirty, ls_files};
use dockyard_build::{BuildLock, StageError, TempContext};
use dockyard_core::{BuildConfig, Confirm, EnvConfig, ProjectMeta};
use tempfile::TempDir;

fn default_meta() -> ProjectMeta {
    ProjectMeta::new("shop-front", PathBuf::from("/srv/shop-front")).unwrap()
}

/// Fixed answer to every confirmation.
struct Answer(bool);

impl Confirm for Answer {
    fn confirm(&self, _question: &str) -> std::io::Result<bool> {
        Ok(self.0)
    }
}

/// Fails the test if a confirmation is requested.
struct NeverAsked;

impl Confirm for NeverAsked {
    fn confirm(&self, question: &str) -> std::io::Result<bool> {
        panic!("unexpected prompt: {question}");
    }
}

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap()
        .status;
    assert!(status.success(), "git {args:?} failed");
}

/// Initialize a git repo with a minimal PHP project and an initial commit.
fn init_git_project(dir: &Path) {
    std::fs::create_dir_all(dir.join("public")).unwrap();
    std::fs::write(dir.join("composer.json"), "{}").unwrap();
    std::fs::write(dir.join("public/index.php"), "<?php echo 'hi';").unwrap();

    git(dir, &["init"]);
    git(dir, &["config", "user.email", "test@test.com"]);
    git(dir, &["config", "user.name", "Test"]);
    git(dir, &["add", "."]);
    git(dir, &["commit", "-m", "init"]);
}

// ── Dockerfile Generation Tests ──

#[test]
fn dockerfile_uses_configured_base_and_workdir() {
    let config = BuildConfig {
        base_image: "php:8.2-apache".to_owned(),
        workdir: "/app".to_owned(),
        ..Default::default()
    };
    let meta = default_meta();
    let output = DockerfileGenerator::new(&config, &meta).render();

    assert!(output.starts_with("# Production image for shop-front"));
    assert!(output.contains("FROM php:8.2-apache\n"));
    assert!(output.contains("WORKDIR /app\n"));
    assert!(output.contains("COPY . .\n"));
    assert!(output.contains("EXPOSE 80\n"));
}

#[test]
fn dockerfile_installs_packages_with_apk_on_alpine() {
    let config = BuildConfig {
        extra_packages: vec!["icu-dev".to_owned(), "git".to_owned()],
        ..Default::default()
    };
    let meta = default_meta();
    let output = DockerfileGenerator::new(&config, &meta).render();

    assert!(output.contains("RUN apk add --no-cache icu-dev git\n"));
    assert!(!output.contains("apt-get"));
}

#[test]
fn dockerfile_installs_packages_with_apt_elsewhere() {
    let config = BuildConfig {
        base_image: "php:8.3-apache".to_owned(),
        extra_packages: vec!["libzip-dev".to_owned()],
        ..Default::default()
    };
    let meta = default_meta();
    let output = DockerfileGenerator::new(&config, &meta).render();

    assert!(output.contains("apt-get install -y libzip-dev"));
}

#[test]
fn dockerfile_no_package_step_when_empty() {
    let config = BuildConfig::default();
    let meta = default_meta();
    let output = DockerfileGenerator::new(&config, &meta).render();

    assert!(!output.contains("apk add"));
    assert!(!output.contains("apt-get"));
}

#[test]
fn dockerfile_env_directives_are_sorted_and_quoted() {
    let config = BuildConfig {
        env: HashMap::from([
            ("TZ".to_owned(), "UTC".to_owned()),
            ("GREETING".to_owned(), "say \"hi\"".to_owned()),
        ]),
        ..Default::default()
    };
    let meta = default_meta();
    let output = DockerfileGenerator::new(&config, &meta).render();

    let greeting = output.find("ENV GREETING=\"say \\\"hi\\\"\"").unwrap();
    let tz = output.find("ENV TZ=\"UTC\"").unwrap();
    assert!(greeting < tz);
}

#[test]
fn dockerfile_run_steps_follow_copy() {
    let config = BuildConfig {
        run: vec![
            "composer install --no-dev".to_owned(),
            "php artisan optimize".to_owned(),
        ],
        ..Default::default()
    };
    let meta = default_meta();
    let output = DockerfileGenerator::new(&config, &meta).render();

    let copy = output.find("COPY . .").unwrap();
    let install = output.find("RUN composer install --no-dev").unwrap();
    let optimize = output.find("RUN php artisan optimize").unwrap();
    assert!(copy < install && install < optimize);
}

#[test]
fn dockerfile_command_in_exec_form() {
    let config = BuildConfig {
        command: Some(vec!["php-fpm".to_owned(), "-F".to_owned()]),
        port: 9000,
        ..Default::default()
    };
    let meta = default_meta();
    let output = DockerfileGenerator::new(&config, &meta).render();

    assert!(output.contains("EXPOSE 9000\n"));
    assert!(output.ends_with("CMD [\"php-fpm\", \"-F\"]\n"));
}

#[test]
fn dockerfile_without_command_keeps_base_default() {
    let output = DockerfileGenerator::new(&BuildConfig::default(), &default_meta()).render();
    assert!(!output.contains("CMD"));
}

// ── Descriptor Write Tests ──

#[test]
fn descriptor_written_without_prompt_when_absent() {
    let tmp = TempDir::new().unwrap();

    let result = write_descriptor(tmp.path(), "Dockerfile.production", "FROM php\n", false, &NeverAsked)
        .unwrap();

    let path = tmp.path().join("Dockerfile.production");
    assert_eq!(result, DescriptorWrite::Written(path.clone()));
    assert_eq!(std::fs::read_to_string(path).unwrap(), "FROM php\n");
}

#[test]
fn descriptor_overwrite_confirmed() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("Dockerfile.production");
    std::fs::write(&path, "FROM old\n").unwrap();

    let result =
        write_descriptor(tmp.path(), "Dockerfile.production", "FROM new\n", false, &Answer(true))
            .unwrap();

    assert_eq!(result, DescriptorWrite::Written(path.clone()));
    assert_eq!(std::fs::read_to_string(path).unwrap(), "FROM new\n");
}

#[test]
fn descriptor_overwrite_declined_keeps_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("Dockerfile.production");
    std::fs::write(&path, "FROM old\n").unwrap();

    let result =
        write_descriptor(tmp.path(), "Dockerfile.production", "FROM new\n", false, &Answer(false))
            .unwrap();

    assert_eq!(result, DescriptorWrite::Declined(path.clone()));
    assert_eq!(std::fs::read_to_string(path).unwrap(), "FROM old\n");
}

#[test]
fn descriptor_overwrite_skips_prompt_when_confirmations_skipped() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("Dockerfile.production");
    std::fs::write(&path, "FROM old\n").unwrap();

    let result =
        write_descriptor(tmp.path(), "Dockerfile.production", "FROM new\n", true, &NeverAsked)
            .unwrap();

    assert_eq!(result, DescriptorWrite::Written(path.clone()));
    assert_eq!(std::fs::read_to_string(path).unwrap(), "FROM new\n");
}

// ── Env File Tests ──

#[test]
fn env_file_overlays_production_values() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join(".env"),
        "APP_NAME=\"My Shop\"\nAPP_ENV=local\nAPP_DEBUG=true\nDB_HOST=db\n",
    )
    .unwrap();

    let config = EnvConfig::default();
    let generator = EnvFileGenerator::new(&config, tmp.path());
    let entries = generator.entries().unwrap();

    assert_eq!(entries["APP_NAME"], "My Shop");
    assert_eq!(entries["APP_ENV"], "production");
    assert_eq!(entries["APP_DEBUG"], "false");
    assert_eq!(entries["DB_HOST"], "db");

    let rendered = generator.render().unwrap();
    assert_eq!(
        rendered,
        "APP_DEBUG=false\nAPP_ENV=production\nAPP_NAME='My Shop'\nDB_HOST=db\n"
    );
}

#[test]
fn env_file_without_source_uses_overrides_only() {
    let tmp = TempDir::new().unwrap();
    let config = EnvConfig::default();

    let rendered = EnvFileGenerator::new(&config, tmp.path()).render().unwrap();

    assert_eq!(rendered, "APP_DEBUG=false\nAPP_ENV=production\n");
}

#[test]
fn env_file_reads_configured_source() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join(".env.local"), "CACHE=redis\n").unwrap();
    let config = EnvConfig {
        source: PathBuf::from(".env.local"),
        production: BTreeMap::new(),
    };

    let rendered = EnvFileGenerator::new(&config, tmp.path()).render().unwrap();

    assert_eq!(rendered, "CACHE=redis\n");
}

#[test]
fn env_file_is_deterministic_and_round_trips() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join(".env"),
        "SECRET='p#ss w$rd'\nQUOTE=\"it's\"\n",
    )
    .unwrap();
    let config = EnvConfig::default();
    let generator = EnvFileGenerator::new(&config, tmp.path());
    let out = TempDir::new().unwrap();

    let path = generator.write_into(out.path()).unwrap();
    let first = std::fs::read_to_string(&path).unwrap();
    generator.write_into(out.path()).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), first);

    let reread: BTreeMap<String, String> = dotenvy::from_path_iter(&path)
        .unwrap()
        .map(|item| item.unwrap())
        .collect();
    assert_eq!(reread["SECRET"], "p#ss w$rd");
    assert_eq!(reread["QUOTE"], "it's");
}

#[test]
fn env_file_invalid_source_is_an_error() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join(".env"), "NOT A VALID LINE\n").unwrap();
    let config = EnvConfig::default();

    let err = EnvFileGenerator::new(&config, tmp.path()).render().unwrap_err();
    assert!(matches!(err, StageError::EnvParse { .. }), "got: {err}");
}

// ── Temp Context Tests ──

#[test]
fn temp_contexts_are_unique_and_removed() {
    let tmp = TempDir::new().unwrap();
    let parent = tmp.path().join("tmp");

    let a = TempContext::create(&parent).unwrap();
    let b = TempContext::create(&parent).unwrap();
    assert_ne!(a.path(), b.path());
    assert!(a.path().starts_with(&parent));
    assert!(
        a.path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("dockyard-build-")
    );

    let a_path = a.path().to_path_buf();
    let b_path = b.path().to_path_buf();
    a.remove().unwrap();
    assert!(!a_path.exists());

    drop(b);
    assert!(!b_path.exists());
}

#[test]
fn stage_sources_mirrors_git_tree() {
    let tmp = TempDir::new().unwrap();
    let project = tmp.path().join("project");
    init_git_project(&project);
    std::fs::write(project.join("untracked.txt"), "new").unwrap();

    let ctx = TempContext::create(&tmp.path().join("tmp")).unwrap();
    let copied = ctx.stage_sources(&project, &[]).unwrap();

    assert_eq!(copied, 3);
    assert!(ctx.path().join("composer.json").exists());
    assert!(ctx.path().join("public/index.php").exists());
    assert!(ctx.path().join("untracked.txt").exists());
    assert!(!ctx.path().join(".git").exists());
}

#[test]
fn stage_sources_respects_gitignore_and_excludes() {
    let tmp = TempDir::new().unwrap();
    let project = tmp.path().join("project");
    std::fs::create_dir_all(project.join("vendor/pkg")).unwrap();
    std::fs::create_dir_all(project.join("var/cache")).unwrap();
    std::fs::write(project.join(".gitignore"), "/vendor\n").unwrap();
    std::fs::write(project.join("vendor/pkg/lib.php"), "<?php").unwrap();
    std::fs::write(project.join("var/cache/app.php"), "<?php").unwrap();
    init_git_project(&project);

    let ctx = TempContext::create(&tmp.path().join("tmp")).unwrap();
    ctx.stage_sources(&project, &[PathBuf::from("var")]).unwrap();

    assert!(!ctx.path().join("vendor").exists());
    assert!(!ctx.path().join("var").exists());
    assert!(ctx.path().join(".gitignore").exists());
    assert!(ctx.path().join("public/index.php").exists());
}

#[test]
fn stage_sources_skips_deleted_files() {
    let tmp = TempDir::new().unwrap();
    let project = tmp.path().join("project");
    init_git_project(&project);
    std::fs::remove_file(project.join("composer.json")).unwrap();

    let ctx = TempContext::create(&tmp.path().join("tmp")).unwrap();
    let copied = ctx.stage_sources(&project, &[]).unwrap();

    assert_eq!(copied, 1);
    assert!(!ctx.path().join("composer.json").exists());
}

#[test]
fn stage_sources_keeps_non_ascii_names() {
    let tmp = TempDir::new().unwrap();
    let project = tmp.path().join("project");
    std::fs::create_dir_all(project.join("résumé")).unwrap();
    std::fs::write(project.join("café.php"), "<?php echo 'café';").unwrap();
    std::fs::write(project.join("résumé/übersicht.php"), "<?php").unwrap();
    init_git_project(&project);

    let ctx = TempContext::create(&tmp.path().join("tmp")).unwrap();
    let copied = ctx.stage_sources(&project, &[]).unwrap();

    assert_eq!(copied, 4);
    assert_eq!(
        std::fs::read_to_string(ctx.path().join("café.php")).unwrap(),
        "<?php echo 'café';"
    );
    assert!(ctx.path().join("résumé/übersicht.php").exists());
}

#[test]
fn stage_sources_fails_outside_git() {
    let tmp = TempDir::new().unwrap();
    let project = tmp.path().join("plain");
    std::fs::create_dir_all(&project).unwrap();

    let ctx = TempContext::create(&tmp.path().join("tmp")).unwrap();
    let err = ctx.stage_sources(&project, &[]).unwrap_err();
    assert!(matches!(err, StageError::GitFailed { .. }), "got: {err}");
}

// ── Build Lock Tests ──

#[test]
fn build_lock_is_exclusive_until_dropped() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("storage/build.lock");

    let first = BuildLock::acquire(&path).unwrap();
    assert_eq!(first.path(), path);

    let second = BuildLock::acquire(&path);
    assert!(matches!(second, Err(StageError::Locked { .. })));

    drop(first);
    BuildLock::acquire(&path).unwrap();
    assert!(path.exists());
}

// ── VCS Tests ──

#[test]
fn metadata_detected_only_in_git_repos() {
    let tmp = TempDir::new().unwrap();
    assert!(!has_metadata(tmp.path()));
    init_git_project(tmp.path());
    assert!(has_metadata(tmp.path()));
}

#[test]
fn ls_files_lists_unquoted_paths() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("naïve file.php"), "<?php").unwrap();
    init_git_project(tmp.path());

    let files = ls_files(tmp.path()).unwrap();

    assert!(files.contains(&PathBuf::from("naïve file.php")));
    assert!(files.contains(&PathBuf::from("public/index.php")));
    assert_eq!(files.len(), 3);
}

#[test]
fn is_dirty_clean_repo() {
    let tmp = TempDir::new().unwrap();
    init_git_project(tmp.path());
    assert!(!is_dirty(tmp.path()).unwrap());
}

#[test]
fn is_dirty_with_uncommitted_changes() {
    let tmp = TempDir::new().unwrap();
    init_git_project(tmp.path());
    std::fs::write(tmp.path().join("public/index.php"), "<?php echo 'dirty';").unwrap();
    assert!(is_dirty(tmp.path()).unwrap());
}

#[test]
fn is_dirty_with_untracked_file() {
    let tmp = TempDir::new().unwrap();
    init_git_project(tmp.path());
    std::fs::write(tmp.path().join("notes.md"), "todo").unwrap();
    assert!(is_dirty(tmp.path()).unwrap());
}

// ── Eject Tests ──

#[test]
fn eject_creates_dockyard_dir_with_dockerfile() {
    let tmp = TempDir::new().unwrap();
    assert!(!is_ejected(tmp.path()));

    let path = eject(tmp.path(), "FROM php\n").unwrap();

    assert!(is_ejected(tmp.path()));
    assert_eq!(path, ejected_path(tmp.path()));
    assert!(tmp.path().join("dockyard/Dockerfile.production").exists());
}

#[test]
fn eject_preserves_dockerfile_content() {
    let tmp = TempDir::new().unwrap();
    let content = DockerfileGenerator::new(&BuildConfig::default(), &default_meta()).render();

    eject(tmp.path(), &content).unwrap();

    assert_eq!(load_ejected_dockerfile(tmp.path()).unwrap(), content);
}

#[test]
fn eject_fails_if_already_ejected() {
    let tmp = TempDir::new().unwrap();
    eject(tmp.path(), "FROM php\n").unwrap();

    let err = eject(tmp.path(), "FROM other\n").unwrap_err().to_string();
    assert!(err.contains("already ejected"), "got: {err}");
    assert_eq!(load_ejected_dockerfile(tmp.path()).unwrap(), "FROM php\n");
}

#[test]
fn load_ejected_fails_without_eject() {
    let tmp = TempDir::new().unwrap();
    assert!(load_ejected_dockerfile(tmp.path()).is_err());
}
