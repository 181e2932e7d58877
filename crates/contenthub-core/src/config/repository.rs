//! Repository-wide broker settings.

use serde::{Deserialize, Serialize};

/// Settings shared by every broker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Id of the project that holds the published copy of every resource.
    #[serde(default = "default_online_project_id")]
    pub online_project_id: i64,
    /// Upper bound for a single access-module call, in milliseconds.
    /// `0` waits indefinitely.
    #[serde(default = "default_access_timeout")]
    pub access_timeout_ms: u64,
    /// Number of lock stripes guarding cache fills and invalidations.
    #[serde(default = "default_lock_stripes")]
    pub lock_stripes: usize,
    /// Name of the group whose members bypass access-flag checks.
    #[serde(default = "default_admin_group")]
    pub admin_group: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            online_project_id: default_online_project_id(),
            access_timeout_ms: default_access_timeout(),
            lock_stripes: default_lock_stripes(),
            admin_group: default_admin_group(),
        }
    }
}

fn default_online_project_id() -> i64 {
    1
}

fn default_access_timeout() -> u64 {
    5000
}

fn default_lock_stripes() -> usize {
    64
}

fn default_admin_group() -> String {
    "Administrators".to_string()
}
