use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use dockyard_core::EnvConfig;

use crate::StageError;

/// File name of the generated env file inside the build context.
pub const ENV_FILE_NAME: &str = ".env";

/// Derives the production `.env` from the development one.
///
/// Every entry of the source file is kept, then `[env.production]` is laid
/// over it. The output is sorted by key so the same inputs always produce
/// the same file.
pub struct EnvFileGenerator<'a> {
    config: &'a EnvConfig,
    project_dir: &'a Path,
}

impl<'a> EnvFileGenerator<'a> {
    pub fn new(config: &'a EnvConfig, project_dir: &'a Path) -> Self {
        Self {
            config,
            project_dir,
        }
    }

    pub fn entries(&self) -> Result<BTreeMap<String, String>, StageError> {
        let source = self.project_dir.join(&self.config.source);
        let mut entries = BTreeMap::new();

        if source.is_file() {
            let iter = dotenvy::from_path_iter(&source).map_err(|e| StageError::EnvParse {
                path: source.clone(),
                source: e,
            })?;
            for item in iter {
                let (key, value) = item.map_err(|e| StageError::EnvParse {
                    path: source.clone(),
                    source: e,
                })?;
                entries.insert(key, value);
            }
        } else {
            tracing::debug!(path = %source.display(), "no source env file, using overrides only");
        }

        for (key, value) in &self.config.production {
            entries.insert(key.clone(), value.clone());
        }

        Ok(entries)
    }

    pub fn render(&self) -> Result<String, StageError> {
        let mut out = String::new();
        for (key, value) in self.entries()? {
            out.push_str(&key);
            out.push('=');
            out.push_str(&quote(&value));
            out.push('\n');
        }
        Ok(out)
    }

    /// Write the production env file into `dir`.
    pub fn write_into(&self, dir: &Path) -> Result<PathBuf, StageError> {
        let path = dir.join(ENV_FILE_NAME);
        let content = self.render()?;
        std::fs::write(&path, content).map_err(|e| StageError::Write {
            path: path.clone(),
            source: e,
        })?;
        Ok(path)
    }
}

/// Quote `value` so a dotenv parser reads it back verbatim.
fn quote(value: &str) -> String {
    let plain = value
        .chars()
        .all(|c| !c.is_whitespace() && !matches!(c, '#' | '"' | '\'' | '\\' | '$' | '`'));
    if plain {
        return value.to_owned();
    }

    // Single quotes are literal: no escapes, no substitution.
    if !value.contains('\'') && !value.contains('\n') {
        return format!("'{value}'");
    }

    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_values_stay_bare() {
        assert_eq!(quote("production"), "production");
        assert_eq!(quote("https://example.com/a?b=c"), "https://example.com/a?b=c");
        assert_eq!(quote(""), "");
    }

    #[test]
    fn spaces_and_specials_use_single_quotes() {
        assert_eq!(quote("My App"), "'My App'");
        assert_eq!(quote("p#ss$word"), "'p#ss$word'");
    }

    #[test]
    fn single_quote_falls_back_to_double_quotes() {
        assert_eq!(quote("it's $HOME"), "\"it's \\$HOME\"");
        assert_eq!(quote("line1\nline2"), "\"line1\\nline2\"");
    }
}
