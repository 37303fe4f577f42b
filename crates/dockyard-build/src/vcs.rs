use std::path::{Path, PathBuf};
use std::process::Command;

use crate::StageError;

/// Whether `project_dir` carries git metadata.
pub fn has_metadata(project_dir: &Path) -> bool {
    project_dir.join(".git").exists()
}

/// Returns the list of files git considers part of the project:
/// tracked files + untracked files that are not .gitignored.
///
/// Names are read NUL-separated and unquoted, so non-ASCII paths survive.
pub fn ls_files(project_dir: &Path) -> Result<Vec<PathBuf>, StageError> {
    let stdout = git_raw(
        project_dir,
        &["ls-files", "-z", "--cached", "--others", "--exclude-standard"],
    )?;

    Ok(stdout
        .split(|b| *b == b'\0')
        .filter(|name| !name.is_empty())
        .map(path_from_bytes)
        .collect())
}

#[cfg(unix)]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(std::ffi::OsStr::from_bytes(bytes))
}

// git emits UTF-8 paths on platforms without byte-oriented OS strings.
#[cfg(not(unix))]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}

/// Checks whether the git working tree has uncommitted changes.
pub fn is_dirty(project_dir: &Path) -> Result<bool, StageError> {
    let stdout = git(project_dir, &["status", "--porcelain"])?;
    Ok(!stdout.trim().is_empty())
}

fn git(project_dir: &Path, args: &[&str]) -> Result<String, StageError> {
    let stdout = git_raw(project_dir, args)?;
    Ok(String::from_utf8_lossy(&stdout).into_owned())
}

fn git_raw(project_dir: &Path, args: &[&str]) -> Result<Vec<u8>, StageError> {
    let output = Command::new("git")
        .args(args)
        .current_dir(project_dir)
        .output()
        .map_err(|e| StageError::GitCommand {
            detail: format!("failed to execute git {}", args.join(" ")),
            source: e,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(StageError::GitFailed {
            detail: format!(
                "git {} exited with {}: {}",
                args.join(" "),
                output.status,
                stderr.trim()
            ),
        });
    }

    Ok(output.stdout)
}
