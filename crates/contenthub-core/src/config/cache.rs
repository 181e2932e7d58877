//! Cache capacity configuration.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Capacity used when a cache is configured with a negative size.
pub const DEFAULT_CAPACITY: usize = 10;

/// Resolved capacity of a single bounded cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheCapacity {
    /// Every lookup misses and every insert is dropped.
    Disabled,
    /// At most this many entries are held.
    Bounded(usize),
}

impl CacheCapacity {
    /// Interpret a configured size.
    ///
    /// `0` disables the cache, positive values bound it, and negative
    /// values fall back to [`DEFAULT_CAPACITY`].
    pub fn from_configured(name: &str, configured: i64) -> Self {
        match configured {
            0 => Self::Disabled,
            n if n < 0 => {
                warn!(
                    cache = name,
                    configured = n,
                    fallback = DEFAULT_CAPACITY,
                    "Negative cache capacity, using default"
                );
                Self::Bounded(DEFAULT_CAPACITY)
            }
            n => Self::Bounded(usize::try_from(n).unwrap_or(usize::MAX)),
        }
    }

    /// Whether the cache stores anything at all.
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Bounded(_))
    }

    /// The maximum number of entries (`0` when disabled).
    pub fn limit(&self) -> usize {
        match self {
            Self::Disabled => 0,
            Self::Bounded(n) => *n,
        }
    }
}

/// Sizes of every broker cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Number of distinct paths held by the resource cache.
    #[serde(default = "default_resource_paths")]
    pub resource_paths: i64,
    /// Number of project snapshots held per cached path.
    #[serde(default = "default_projects_per_path")]
    pub resource_projects_per_path: i64,
    /// Number of projects held by the project cache.
    #[serde(default = "default_projects")]
    pub projects: i64,
    /// Number of users held by the user cache.
    #[serde(default = "default_users")]
    pub users: i64,
    /// Number of groups held by the group cache.
    #[serde(default = "default_groups")]
    pub groups: i64,
    /// Number of "groups of user" closures held.
    #[serde(default = "default_groups_of_user")]
    pub groups_of_user: i64,
    /// Number of property definitions held.
    #[serde(default = "default_property_definitions")]
    pub property_definitions: i64,
    /// Whether "user in group" answers are memoized.
    #[serde(default = "default_true")]
    pub memoize_user_in_group: bool,
    /// Number of "user in group" answers held before the memo starts over.
    #[serde(default = "default_user_in_group_answers")]
    pub user_in_group_answers: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            resource_paths: default_resource_paths(),
            resource_projects_per_path: default_projects_per_path(),
            projects: default_projects(),
            users: default_users(),
            groups: default_groups(),
            groups_of_user: default_groups_of_user(),
            property_definitions: default_property_definitions(),
            memoize_user_in_group: default_true(),
            user_in_group_answers: default_user_in_group_answers(),
        }
    }
}

impl CacheConfig {
    /// A configuration with every cache disabled.
    pub fn disabled() -> Self {
        Self {
            resource_paths: 0,
            resource_projects_per_path: 0,
            projects: 0,
            users: 0,
            groups: 0,
            groups_of_user: 0,
            property_definitions: 0,
            memoize_user_in_group: false,
            user_in_group_answers: 0,
        }
    }
}

fn default_resource_paths() -> i64 {
    1000
}

fn default_projects_per_path() -> i64 {
    10
}

fn default_projects() -> i64 {
    100
}

fn default_users() -> i64 {
    200
}

fn default_groups() -> i64 {
    100
}

fn default_groups_of_user() -> i64 {
    200
}

fn default_property_definitions() -> i64 {
    100
}

fn default_user_in_group_answers() -> i64 {
    10_000
}

fn default_true() -> bool {
    true
}
