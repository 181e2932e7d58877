//! The access-module interface.

use async_trait::async_trait;

use contenthub_core::result::AppResult;
use contenthub_core::types::{GroupId, ProjectId, PropertyDefinitionId, UserId};
use contenthub_entity::{
    BackupProject, BackupResource, Group, Project, PropertyDefinition, Resource, ResourcePath,
    ResourceType, User,
};

/// Backing store for resources, projects, principals, and history.
///
/// Reads inside an offline project see that project's own version of a
/// path if one exists and the online version otherwise. Writes always land
/// in the named project; writing a header whose content is absent keeps
/// (or, on first write into the project, copies) the content already
/// stored for that path. Every method may fail with a repository error,
/// which callers must pass on unchanged.
#[async_trait]
pub trait AccessModule: Send + Sync + std::fmt::Debug + 'static {
    // ── Resources ──────────────────────────────────────────────

    /// Read the header (no content) of `path` as seen from `project`.
    async fn read_resource(
        &self,
        project: ProjectId,
        path: &ResourcePath,
    ) -> AppResult<Option<Resource>>;

    /// Read `path` as seen from `project`, including file content.
    async fn read_file_content(
        &self,
        project: ProjectId,
        path: &ResourcePath,
    ) -> AppResult<Option<Resource>>;

    /// Create a resource in `project` and return it with its id assigned.
    async fn create_resource(&self, project: ProjectId, resource: &Resource)
    -> AppResult<Resource>;

    /// Write `resource` into `project` and return the stored header.
    async fn write_resource(&self, project: ProjectId, resource: &Resource)
    -> AppResult<Resource>;

    /// Tombstone `path` in `project`.
    async fn delete_resource(&self, project: ProjectId, path: &ResourcePath) -> AppResult<()>;

    /// Destroy the entry of `path` stored in `project`. Absent entries are
    /// not an error.
    async fn remove_resource(&self, project: ProjectId, path: &ResourcePath) -> AppResult<()>;

    /// Direct children of `folder` as seen from `project`, ordered by path.
    async fn list_children(
        &self,
        project: ProjectId,
        folder: &ResourcePath,
    ) -> AppResult<Vec<Resource>>;

    /// Headers of every entry stored in `project` itself, ordered by path.
    async fn list_project_resources(&self, project: ProjectId) -> AppResult<Vec<Resource>>;

    // ── Projects ───────────────────────────────────────────────

    async fn read_project(&self, id: ProjectId) -> AppResult<Option<Project>>;

    async fn create_project(&self, project: &Project) -> AppResult<Project>;

    async fn write_project(&self, project: &Project) -> AppResult<Project>;

    async fn delete_project(&self, id: ProjectId) -> AppResult<()>;

    async fn list_projects(&self) -> AppResult<Vec<Project>>;

    // ── Users and groups ───────────────────────────────────────

    async fn read_user(&self, name: &str) -> AppResult<Option<User>>;

    async fn read_user_by_id(&self, id: UserId) -> AppResult<Option<User>>;

    async fn create_user(&self, user: &User) -> AppResult<User>;

    async fn write_user(&self, user: &User) -> AppResult<User>;

    async fn delete_user(&self, id: UserId) -> AppResult<()>;

    async fn read_group(&self, name: &str) -> AppResult<Option<Group>>;

    async fn read_group_by_id(&self, id: GroupId) -> AppResult<Option<Group>>;

    async fn create_group(&self, group: &Group) -> AppResult<Group>;

    async fn write_group(&self, group: &Group) -> AppResult<Group>;

    async fn delete_group(&self, id: GroupId) -> AppResult<()>;

    /// Groups `user` is a direct member of.
    async fn groups_of_user(&self, user: UserId) -> AppResult<Vec<Group>>;

    /// Direct members of `group`.
    async fn users_of_group(&self, group: GroupId) -> AppResult<Vec<User>>;

    async fn add_user_to_group(&self, user: UserId, group: GroupId) -> AppResult<()>;

    async fn remove_user_from_group(&self, user: UserId, group: GroupId) -> AppResult<()>;

    // ── Property definitions ───────────────────────────────────

    async fn read_property_definition(
        &self,
        resource_type: ResourceType,
        name: &str,
    ) -> AppResult<Option<PropertyDefinition>>;

    async fn create_property_definition(
        &self,
        definition: &PropertyDefinition,
    ) -> AppResult<PropertyDefinition>;

    async fn delete_property_definition(&self, id: PropertyDefinitionId) -> AppResult<()>;

    // ── History ────────────────────────────────────────────────

    /// Reserve the version number of the next backup.
    async fn next_backup_version(&self) -> AppResult<i64>;

    async fn write_backup(
        &self,
        project: &BackupProject,
        resources: &[BackupResource],
    ) -> AppResult<()>;

    async fn read_backup_project(&self, version: i64) -> AppResult<Option<BackupProject>>;

    /// Every backup, oldest first.
    async fn read_backup_projects(&self) -> AppResult<Vec<BackupProject>>;

    async fn read_backup_resources(&self, version: i64) -> AppResult<Vec<BackupResource>>;
}
