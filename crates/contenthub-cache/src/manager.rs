//! The full set of broker caches, built once from configuration.

use tracing::info;

use contenthub_core::config::cache::{CacheCapacity, CacheConfig};
use contenthub_core::types::ProjectId;
use contenthub_entity::{Group, Project, PropertyDefinition, User};

use crate::memo::MembershipMemo;
use crate::object_cache::{CacheStats, ObjectCache};
use crate::resource_cache::ResourceCache;

/// Owner of every cache the brokers consult.
///
/// Constructed once at startup and shared by handle; tests build their own
/// instance so no state leaks between them.
#[derive(Debug)]
pub struct CacheManager {
    resources: ResourceCache,
    projects: ObjectCache<ProjectId, Project>,
    users: ObjectCache<String, User>,
    groups: ObjectCache<String, Group>,
    groups_of_user: ObjectCache<String, Vec<Group>>,
    user_in_group: MembershipMemo,
    property_definitions: ObjectCache<String, PropertyDefinition>,
}

impl CacheManager {
    /// Build every cache from configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let capacity = CacheCapacity::from_configured;
        let manager = Self {
            resources: ResourceCache::new(
                capacity("resources", config.resource_paths),
                capacity(
                    "resources_per_path",
                    config.resource_projects_per_path,
                ),
            ),
            projects: ObjectCache::new("projects", capacity("projects", config.projects)),
            users: ObjectCache::new("users", capacity("users", config.users)),
            groups: ObjectCache::new("groups", capacity("groups", config.groups)),
            groups_of_user: ObjectCache::new(
                "groups_of_user",
                capacity("groups_of_user", config.groups_of_user),
            ),
            user_in_group: MembershipMemo::new(if config.memoize_user_in_group {
                capacity("user_in_group", config.user_in_group_answers)
            } else {
                CacheCapacity::Disabled
            }),
            property_definitions: ObjectCache::new(
                "property_definitions",
                capacity("property_definitions", config.property_definitions),
            ),
        };
        info!(
            resources = manager.resources.is_enabled(),
            projects = manager.projects.is_enabled(),
            users = manager.users.is_enabled(),
            "Initialized broker caches"
        );
        manager
    }

    /// Resource headers by `(path, project)`.
    pub fn resources(&self) -> &ResourceCache {
        &self.resources
    }

    /// Projects by id.
    pub fn projects(&self) -> &ObjectCache<ProjectId, Project> {
        &self.projects
    }

    /// Users by name, also indexed by id.
    pub fn users(&self) -> &ObjectCache<String, User> {
        &self.users
    }

    /// Groups by name, also indexed by id.
    pub fn groups(&self) -> &ObjectCache<String, Group> {
        &self.groups
    }

    /// Transitive group closures by user name.
    pub fn groups_of_user(&self) -> &ObjectCache<String, Vec<Group>> {
        &self.groups_of_user
    }

    /// Memoized membership answers.
    pub fn user_in_group(&self) -> &MembershipMemo {
        &self.user_in_group
    }

    /// Property definitions by `(resource type, name)`.
    pub fn property_definitions(&self) -> &ObjectCache<String, PropertyDefinition> {
        &self.property_definitions
    }

    /// Drop every cached value.
    pub fn clear_all(&self) {
        self.resources.clear();
        self.projects.clear();
        self.users.clear();
        self.groups.clear();
        self.groups_of_user.clear();
        self.user_in_group.clear();
        self.property_definitions.clear();
    }

    /// Counters of every cache, by name.
    pub fn stats(&self) -> Vec<(&'static str, CacheStats)> {
        vec![
            ("resources", self.resources.stats()),
            (self.projects.name(), self.projects.stats()),
            (self.users.name(), self.users.stats()),
            (self.groups.name(), self.groups.stats()),
            (self.groups_of_user.name(), self.groups_of_user.stats()),
            (
                self.property_definitions.name(),
                self.property_definitions.stats(),
            ),
        ]
    }
}

impl Default for CacheManager {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}
