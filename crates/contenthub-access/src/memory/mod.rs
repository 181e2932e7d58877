//! In-process access module.
//!
//! Holds every project's resources, the principals, property definitions,
//! and backups in one mutex-guarded store. Offline projects are layered
//! over the online project: a path with no entry of its own reads through
//! to the online version, and the first write into the offline project
//! copies the content it inherits.
//!
//! Faults can be injected per operation to exercise the error and timeout
//! paths of the code built on top.

mod fault;
mod store;

pub use fault::Fault;

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::debug;

use contenthub_core::result::AppResult;
use contenthub_core::types::{GroupId, ProjectId, PropertyDefinitionId, UserId};
use contenthub_entity::{
    BackupProject, BackupResource, Group, Project, PropertyDefinition, Resource, ResourcePath,
    ResourceType, User,
};

use crate::module::AccessModule;
use fault::FaultPlan;
use store::Store;

/// Access module backed by process memory.
#[derive(Debug)]
pub struct MemoryAccessModule {
    store: Mutex<Store>,
    faults: FaultPlan,
}

impl MemoryAccessModule {
    /// Create an empty store whose online project is `online`.
    pub fn new(online: ProjectId) -> Self {
        debug!(online_project = %online, "Created in-memory access module");
        Self {
            store: Mutex::new(Store::new(online)),
            faults: FaultPlan::default(),
        }
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The online project id this store layers offline projects over.
    pub fn online_project_id(&self) -> ProjectId {
        self.store().online()
    }

    /// Raise `fault` on every call of `operation` (a method name of
    /// [`AccessModule`]) until [`clear_faults`](Self::clear_faults).
    pub fn inject(&self, operation: &'static str, fault: Fault) {
        self.faults.set(operation, fault);
    }

    /// Remove every injected fault.
    pub fn clear_faults(&self) {
        self.faults.clear();
    }

    /// How many times `operation` has been called.
    pub fn calls(&self, operation: &str) -> u64 {
        self.faults.calls(operation)
    }
}

#[async_trait]
impl AccessModule for MemoryAccessModule {
    async fn read_resource(
        &self,
        project: ProjectId,
        path: &ResourcePath,
    ) -> AppResult<Option<Resource>> {
        self.faults.enter("read_resource").await?;
        Ok(self.store().visible(project, path).map(Resource::header))
    }

    async fn read_file_content(
        &self,
        project: ProjectId,
        path: &ResourcePath,
    ) -> AppResult<Option<Resource>> {
        self.faults.enter("read_file_content").await?;
        Ok(self.store().visible(project, path).cloned())
    }

    async fn create_resource(
        &self,
        project: ProjectId,
        resource: &Resource,
    ) -> AppResult<Resource> {
        self.faults.enter("create_resource").await?;
        self.store().create_resource(project, resource)
    }

    async fn write_resource(
        &self,
        project: ProjectId,
        resource: &Resource,
    ) -> AppResult<Resource> {
        self.faults.enter("write_resource").await?;
        self.store().write_resource(project, resource)
    }

    async fn delete_resource(&self, project: ProjectId, path: &ResourcePath) -> AppResult<()> {
        self.faults.enter("delete_resource").await?;
        self.store().delete_resource(project, path)
    }

    async fn remove_resource(&self, project: ProjectId, path: &ResourcePath) -> AppResult<()> {
        self.faults.enter("remove_resource").await?;
        self.store().remove_resource(project, path);
        Ok(())
    }

    async fn list_children(
        &self,
        project: ProjectId,
        folder: &ResourcePath,
    ) -> AppResult<Vec<Resource>> {
        self.faults.enter("list_children").await?;
        Ok(self.store().list_children(project, folder))
    }

    async fn list_project_resources(&self, project: ProjectId) -> AppResult<Vec<Resource>> {
        self.faults.enter("list_project_resources").await?;
        Ok(self.store().list_project_resources(project))
    }

    async fn read_project(&self, id: ProjectId) -> AppResult<Option<Project>> {
        self.faults.enter("read_project").await?;
        Ok(self.store().read_project(id))
    }

    async fn create_project(&self, project: &Project) -> AppResult<Project> {
        self.faults.enter("create_project").await?;
        self.store().create_project(project)
    }

    async fn write_project(&self, project: &Project) -> AppResult<Project> {
        self.faults.enter("write_project").await?;
        self.store().write_project(project)
    }

    async fn delete_project(&self, id: ProjectId) -> AppResult<()> {
        self.faults.enter("delete_project").await?;
        self.store().delete_project(id)
    }

    async fn list_projects(&self) -> AppResult<Vec<Project>> {
        self.faults.enter("list_projects").await?;
        Ok(self.store().list_projects())
    }

    async fn read_user(&self, name: &str) -> AppResult<Option<User>> {
        self.faults.enter("read_user").await?;
        Ok(self.store().read_user(name))
    }

    async fn read_user_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        self.faults.enter("read_user_by_id").await?;
        Ok(self.store().read_user_by_id(id))
    }

    async fn create_user(&self, user: &User) -> AppResult<User> {
        self.faults.enter("create_user").await?;
        self.store().create_user(user)
    }

    async fn write_user(&self, user: &User) -> AppResult<User> {
        self.faults.enter("write_user").await?;
        self.store().write_user(user)
    }

    async fn delete_user(&self, id: UserId) -> AppResult<()> {
        self.faults.enter("delete_user").await?;
        self.store().delete_user(id)
    }

    async fn read_group(&self, name: &str) -> AppResult<Option<Group>> {
        self.faults.enter("read_group").await?;
        Ok(self.store().read_group(name))
    }

    async fn read_group_by_id(&self, id: GroupId) -> AppResult<Option<Group>> {
        self.faults.enter("read_group_by_id").await?;
        Ok(self.store().read_group_by_id(id))
    }

    async fn create_group(&self, group: &Group) -> AppResult<Group> {
        self.faults.enter("create_group").await?;
        self.store().create_group(group)
    }

    async fn write_group(&self, group: &Group) -> AppResult<Group> {
        self.faults.enter("write_group").await?;
        self.store().write_group(group)
    }

    async fn delete_group(&self, id: GroupId) -> AppResult<()> {
        self.faults.enter("delete_group").await?;
        self.store().delete_group(id)
    }

    async fn groups_of_user(&self, user: UserId) -> AppResult<Vec<Group>> {
        self.faults.enter("groups_of_user").await?;
        Ok(self.store().groups_of_user(user))
    }

    async fn users_of_group(&self, group: GroupId) -> AppResult<Vec<User>> {
        self.faults.enter("users_of_group").await?;
        Ok(self.store().users_of_group(group))
    }

    async fn add_user_to_group(&self, user: UserId, group: GroupId) -> AppResult<()> {
        self.faults.enter("add_user_to_group").await?;
        self.store().add_user_to_group(user, group)
    }

    async fn remove_user_from_group(&self, user: UserId, group: GroupId) -> AppResult<()> {
        self.faults.enter("remove_user_from_group").await?;
        self.store().remove_user_from_group(user, group);
        Ok(())
    }

    async fn read_property_definition(
        &self,
        resource_type: ResourceType,
        name: &str,
    ) -> AppResult<Option<PropertyDefinition>> {
        self.faults.enter("read_property_definition").await?;
        Ok(self.store().read_property_definition(resource_type, name))
    }

    async fn create_property_definition(
        &self,
        definition: &PropertyDefinition,
    ) -> AppResult<PropertyDefinition> {
        self.faults.enter("create_property_definition").await?;
        self.store().create_property_definition(definition)
    }

    async fn delete_property_definition(&self, id: PropertyDefinitionId) -> AppResult<()> {
        self.faults.enter("delete_property_definition").await?;
        self.store().delete_property_definition(id)
    }

    async fn next_backup_version(&self) -> AppResult<i64> {
        self.faults.enter("next_backup_version").await?;
        Ok(self.store().next_backup_version())
    }

    async fn write_backup(
        &self,
        project: &BackupProject,
        resources: &[BackupResource],
    ) -> AppResult<()> {
        self.faults.enter("write_backup").await?;
        self.store().write_backup(project, resources)
    }

    async fn read_backup_project(&self, version: i64) -> AppResult<Option<BackupProject>> {
        self.faults.enter("read_backup_project").await?;
        Ok(self.store().read_backup_project(version))
    }

    async fn read_backup_projects(&self) -> AppResult<Vec<BackupProject>> {
        self.faults.enter("read_backup_projects").await?;
        Ok(self.store().read_backup_projects())
    }

    async fn read_backup_resources(&self, version: i64) -> AppResult<Vec<BackupResource>> {
        self.faults.enter("read_backup_resources").await?;
        Ok(self.store().read_backup_resources(version))
    }
}
