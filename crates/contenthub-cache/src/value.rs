//! The closed set of values the caches may hold.
//!
//! Every cached type implements [`CacheValue`], which supplies the deep
//! clone used on both the way in and the way out of a cache. A type outside
//! this set cannot be stored: the bound is checked at compile time, so the
//! "unrecognized kind" case never reaches runtime.

use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;

use contenthub_entity::{Group, Project, PropertyDefinition, Resource, ResourceKind, User};

/// The kind of a cached value, used for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Boolean,
    File,
    Folder,
    User,
    Group,
    Project,
    PropertyDefinition,
    Sequence,
    Mapping,
    Text,
    Bytes,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Boolean => "boolean",
            Self::File => "file",
            Self::Folder => "folder",
            Self::User => "user",
            Self::Group => "group",
            Self::Project => "project",
            Self::PropertyDefinition => "property_definition",
            Self::Sequence => "sequence",
            Self::Mapping => "mapping",
            Self::Text => "text",
            Self::Bytes => "bytes",
        };
        f.write_str(name)
    }
}

/// A value that can be stored in a cache.
///
/// `deep_clone` must return a value sharing no mutable state with `self`.
pub trait CacheValue: Send + 'static {
    /// The kind of this value.
    fn kind(&self) -> ValueKind;

    /// An independent copy of this value.
    fn deep_clone(&self) -> Self
    where
        Self: Sized;
}

impl CacheValue for bool {
    fn kind(&self) -> ValueKind {
        ValueKind::Boolean
    }

    fn deep_clone(&self) -> Self {
        *self
    }
}

impl CacheValue for String {
    fn kind(&self) -> ValueKind {
        ValueKind::Text
    }

    fn deep_clone(&self) -> Self {
        self.clone()
    }
}

impl CacheValue for Bytes {
    fn kind(&self) -> ValueKind {
        ValueKind::Bytes
    }

    fn deep_clone(&self) -> Self {
        Bytes::copy_from_slice(self)
    }
}

impl CacheValue for Resource {
    fn kind(&self) -> ValueKind {
        match self.kind {
            ResourceKind::Folder => ValueKind::Folder,
            ResourceKind::File { .. } => ValueKind::File,
        }
    }

    fn deep_clone(&self) -> Self {
        let mut copy = self.clone();
        if let ResourceKind::File {
            content: Some(content),
        } = &mut copy.kind
        {
            *content = content.deep_clone();
        }
        copy
    }
}

impl CacheValue for User {
    fn kind(&self) -> ValueKind {
        ValueKind::User
    }

    fn deep_clone(&self) -> Self {
        self.clone()
    }
}

impl CacheValue for Group {
    fn kind(&self) -> ValueKind {
        ValueKind::Group
    }

    fn deep_clone(&self) -> Self {
        self.clone()
    }
}

impl CacheValue for Project {
    fn kind(&self) -> ValueKind {
        ValueKind::Project
    }

    fn deep_clone(&self) -> Self {
        self.clone()
    }
}

impl CacheValue for PropertyDefinition {
    fn kind(&self) -> ValueKind {
        ValueKind::PropertyDefinition
    }

    fn deep_clone(&self) -> Self {
        self.clone()
    }
}

impl<T: CacheValue> CacheValue for Vec<T> {
    fn kind(&self) -> ValueKind {
        ValueKind::Sequence
    }

    fn deep_clone(&self) -> Self {
        self.iter().map(CacheValue::deep_clone).collect()
    }
}

impl<T: CacheValue> CacheValue for BTreeMap<String, T> {
    fn kind(&self) -> ValueKind {
        ValueKind::Mapping
    }

    fn deep_clone(&self) -> Self {
        self.iter().map(|(k, v)| (k.clone(), v.deep_clone())).collect()
    }
}
