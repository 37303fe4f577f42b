//! Archive destination checks.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use path_absolutize::Absolutize;

use crate::error::PipelineError;

/// Create the default export root if it is missing.
pub fn ensure_export_root(root: &Path) -> Result<(), PipelineError> {
    std::fs::create_dir_all(root).map_err(|e| PipelineError::Io {
        path: root.to_path_buf(),
        source: e,
    })
}

/// Resolve `dir` to an absolute path and check it can receive an archive.
///
/// Checked in order: exists, is a directory, is writable. Writability is
/// probed by creating (and immediately discarding) an anonymous file.
pub fn validate_export_dir(dir: &Path) -> Result<PathBuf, PipelineError> {
    let absolute = dir
        .absolutize()
        .map_err(|e| PipelineError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?
        .into_owned();

    let metadata = match std::fs::metadata(&absolute) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(PipelineError::ExportDirMissing { path: absolute });
        }
        Err(e) => {
            return Err(PipelineError::Io {
                path: absolute,
                source: e,
            });
        }
    };

    if !metadata.is_dir() {
        return Err(PipelineError::ExportDirNotADirectory { path: absolute });
    }

    if let Err(e) = tempfile::tempfile_in(&absolute) {
        return Err(PipelineError::ExportDirNotWritable {
            path: absolute,
            source: e,
        });
    }

    Ok(absolute)
}
