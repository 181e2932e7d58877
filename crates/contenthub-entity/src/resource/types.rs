//! Resource type enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The type of a resource, deciding how its content is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    /// A container for other resources.
    Folder,
    /// Plain text content.
    Plain,
    /// Arbitrary binary content.
    Binary,
    /// A link to an external location.
    Link,
    /// A pointer to another resource in the namespace.
    Pointer,
    /// A structured page.
    Page,
}

impl ResourceType {
    /// Numeric type id as persisted by the access module.
    pub fn type_id(&self) -> i32 {
        match self {
            Self::Folder => 0,
            Self::Plain => 1,
            Self::Binary => 2,
            Self::Link => 3,
            Self::Pointer => 4,
            Self::Page => 5,
        }
    }

    /// Whether resources of this type are folders.
    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder)
    }

    /// Return the type as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::Plain => "plain",
            Self::Binary => "binary",
            Self::Link => "link",
            Self::Pointer => "pointer",
            Self::Page => "page",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = contenthub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "folder" => Ok(Self::Folder),
            "plain" => Ok(Self::Plain),
            "binary" => Ok(Self::Binary),
            "link" => Ok(Self::Link),
            "pointer" => Ok(Self::Pointer),
            "page" => Ok(Self::Page),
            _ => Err(contenthub_core::AppError::validation(format!(
                "Invalid resource type: '{s}'"
            ))),
        }
    }
}
