//! Absolute, slash-separated resource paths.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use contenthub_core::error::AppError;

/// An absolute path in the resource namespace.
///
/// Paths are stored normalized: they always start with `/`, never contain
/// empty, `.` or `..` segments, and never end with a separator except for
/// the root itself. Whether a path names a file or a folder is carried by
/// [`super::ResourceKind`], not by the string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourcePath(String);

impl ResourcePath {
    /// The path separator.
    pub const SEPARATOR: char = '/';

    /// The root folder.
    pub fn root() -> Self {
        Self(Self::SEPARATOR.to_string())
    }

    /// Parse and normalize a raw path.
    ///
    /// A single trailing separator is accepted and dropped, so `/docs/` and
    /// `/docs` name the same resource.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        if !raw.starts_with(Self::SEPARATOR) {
            return Err(AppError::validation(format!(
                "Resource path '{raw}' must be absolute"
            )));
        }
        if raw == "/" {
            return Ok(Self::root());
        }

        let trimmed = raw.strip_suffix(Self::SEPARATOR).unwrap_or(raw);
        for segment in trimmed[1..].split(Self::SEPARATOR) {
            if segment.is_empty() || segment == "." || segment == ".." {
                return Err(AppError::validation(format!(
                    "Resource path '{raw}' contains an invalid segment"
                )));
            }
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The normalized path string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the root folder.
    pub fn is_root(&self) -> bool {
        self.0.len() == 1
    }

    /// The containing folder, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind(Self::SEPARATOR) {
            Some(0) => Some(Self::root()),
            Some(idx) => Some(Self(self.0[..idx].to_string())),
            None => None,
        }
    }

    /// The last segment (empty for the root).
    pub fn name(&self) -> &str {
        match self.0.rfind(Self::SEPARATOR) {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        }
    }

    /// Append a single child name.
    pub fn join(&self, name: &str) -> Result<Self, AppError> {
        if name.is_empty() || name.contains(Self::SEPARATOR) {
            return Err(AppError::validation(format!(
                "'{name}' is not a valid resource name"
            )));
        }
        if self.is_root() {
            Self::parse(&format!("/{name}"))
        } else {
            Self::parse(&format!("{}/{name}", self.0))
        }
    }

    /// Whether `self` lies strictly below `ancestor`.
    pub fn is_descendant_of(&self, ancestor: &ResourcePath) -> bool {
        if self == ancestor {
            return false;
        }
        if ancestor.is_root() {
            return true;
        }
        self.0
            .strip_prefix(ancestor.as_str())
            .is_some_and(|rest| rest.starts_with(Self::SEPARATOR))
    }

    /// Number of segments below the root.
    pub fn depth(&self) -> usize {
        if self.is_root() {
            0
        } else {
            self.0.matches(Self::SEPARATOR).count()
        }
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ResourcePath {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ResourcePath {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ResourcePath> for String {
    fn from(path: ResourcePath) -> String {
        path.0
    }
}

impl AsRef<str> for ResourcePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
