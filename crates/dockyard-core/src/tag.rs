//! Image tags of the form `<app>:<YYYY-MM-DD_HH-MM-SS>`.
//!
//! The tag is the contract between a build, the engine's image store and
//! whoever consumes an exported archive, so its shape is fixed:
//! `^[a-z0-9_]+:\d{4}-\d{2}-\d{2}_\d{2}-\d{2}-\d{2}$`.

use std::fmt;

use chrono::{DateTime, Local, TimeZone};

/// `strftime` layout of the tag's version half.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Lower-cases `name`, maps spaces and hyphens to `_` and drops every
/// other character outside `[a-z0-9_]`.
///
/// ```
/// use dockyard_core::tag::normalize_app_name;
///
/// assert_eq!(normalize_app_name("My Shop-API"), "my_shop_api");
/// assert_eq!(normalize_app_name("café.io"), "cafio");
/// ```
pub fn normalize_app_name(name: &str) -> String {
    name.chars()
        .flat_map(char::to_lowercase)
        .filter_map(|c| match c {
            ' ' | '-' => Some('_'),
            'a'..='z' | '0'..='9' | '_' => Some(c),
            _ => None,
        })
        .collect()
}

/// A production image tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageTag {
    repository: String,
    version: String,
}

impl ImageTag {
    /// Tag for `app_name` stamped with the current local time.
    pub fn now(app_name: &str) -> Self {
        Self::at(app_name, &Local::now())
    }

    /// Tag for `app_name` stamped with `time`, at second resolution.
    pub fn at<Tz>(app_name: &str, time: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        Self {
            repository: normalize_app_name(app_name),
            version: time.format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// File name of the archive this tag is exported to.
    pub fn archive_file_name(&self, extension: &str) -> String {
        format!("{self}.{extension}")
    }
}

impl fmt::Display for ImageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.version)
    }
}
