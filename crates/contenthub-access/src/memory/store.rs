//! State behind the in-memory access module.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use bytes::Bytes;

use contenthub_core::error::AppError;
use contenthub_core::result::AppResult;
use contenthub_core::types::{GroupId, ProjectId, PropertyDefinitionId, ResourceId, UserId};
use contenthub_entity::{
    BackupProject, BackupResource, Group, Project, PropertyDefinition, Resource, ResourceKind,
    ResourcePath, ResourceState, ResourceType, User,
};

/// Monotonic id sequences, one per entity.
#[derive(Debug, Default)]
struct Sequences {
    resource: i64,
    project: i64,
    user: i64,
    group: i64,
    property: i64,
    backup: i64,
}

/// Take `requested` if non-zero, otherwise the next value of `sequence`.
/// The sequence never hands out a value at or below an explicit id.
fn assign(sequence: &mut i64, requested: i64) -> i64 {
    if requested != 0 {
        *sequence = (*sequence).max(requested);
        requested
    } else {
        *sequence += 1;
        *sequence
    }
}

#[derive(Debug)]
pub(crate) struct Store {
    online: ProjectId,
    resources: HashMap<ProjectId, BTreeMap<ResourcePath, Resource>>,
    projects: BTreeMap<ProjectId, Project>,
    users: BTreeMap<UserId, User>,
    groups: BTreeMap<GroupId, Group>,
    memberships: BTreeSet<(UserId, GroupId)>,
    properties: BTreeMap<PropertyDefinitionId, PropertyDefinition>,
    backups: BTreeMap<i64, (BackupProject, Vec<BackupResource>)>,
    sequences: Sequences,
}

impl Store {
    pub(crate) fn new(online: ProjectId) -> Self {
        Self {
            online,
            resources: HashMap::new(),
            projects: BTreeMap::new(),
            users: BTreeMap::new(),
            groups: BTreeMap::new(),
            memberships: BTreeSet::new(),
            properties: BTreeMap::new(),
            backups: BTreeMap::new(),
            sequences: Sequences::default(),
        }
    }

    pub(crate) fn online(&self) -> ProjectId {
        self.online
    }

    // ── Resources ──────────────────────────────────────────────

    fn own(&self, project: ProjectId, path: &ResourcePath) -> Option<&Resource> {
        self.resources.get(&project).and_then(|m| m.get(path))
    }

    /// The version of `path` seen from `project`.
    pub(crate) fn visible(&self, project: ProjectId, path: &ResourcePath) -> Option<&Resource> {
        self.own(project, path).or_else(|| {
            if project == self.online {
                None
            } else {
                self.own(self.online, path)
            }
        })
    }

    fn require_project(&self, project: ProjectId) -> AppResult<()> {
        if self.projects.contains_key(&project) {
            Ok(())
        } else {
            Err(AppError::not_found(format!("Project {project} not found")))
        }
    }

    pub(crate) fn create_resource(
        &mut self,
        project: ProjectId,
        resource: &Resource,
    ) -> AppResult<Resource> {
        self.require_project(project)?;
        if self.visible(project, &resource.path).is_some() {
            return Err(AppError::conflict(format!(
                "Resource {} already exists in project {project}",
                resource.path
            )));
        }
        if let Some(parent) = resource.path.parent() {
            match self.visible(project, &parent) {
                Some(found) if found.is_folder() && !found.is_deleted() => {}
                _ => {
                    return Err(AppError::not_found(format!(
                        "Parent folder {parent} not found in project {project}"
                    )));
                }
            }
        }

        let mut stored = resource.clone();
        stored.id = ResourceId(assign(&mut self.sequences.resource, resource.id.get()));
        stored.project_id = project;
        if let Some(length) = stored.content().map(|c| c.len() as u64) {
            stored.length = length;
        }
        let header = stored.header();
        self.resources
            .entry(project)
            .or_default()
            .insert(stored.path.clone(), stored);
        Ok(header)
    }

    /// Content stored for `path` as seen from `project`, if any.
    fn inherited_content(&self, project: ProjectId, path: &ResourcePath) -> Option<Bytes> {
        self.visible(project, path)
            .and_then(|r| r.content())
            .cloned()
    }

    pub(crate) fn write_resource(
        &mut self,
        project: ProjectId,
        resource: &Resource,
    ) -> AppResult<Resource> {
        if self.visible(project, &resource.path).is_none() {
            return Err(AppError::not_found(format!(
                "Resource {} not found in project {project}",
                resource.path
            )));
        }
        let mut stored = resource.clone();
        stored.project_id = project;
        match &mut stored.kind {
            ResourceKind::File { content } if content.is_none() => {
                *content = self.inherited_content(project, &resource.path);
            }
            ResourceKind::File { content: Some(bytes) } => {
                stored.length = bytes.len() as u64;
            }
            _ => {}
        }
        let header = stored.header();
        self.resources
            .entry(project)
            .or_default()
            .insert(stored.path.clone(), stored);
        Ok(header)
    }

    pub(crate) fn delete_resource(
        &mut self,
        project: ProjectId,
        path: &ResourcePath,
    ) -> AppResult<()> {
        let Some(found) = self.visible(project, path) else {
            return Err(AppError::not_found(format!(
                "Resource {path} not found in project {project}"
            )));
        };
        let mut tombstone = found.clone();
        tombstone.project_id = project;
        tombstone.state = ResourceState::Deleted;
        self.resources
            .entry(project)
            .or_default()
            .insert(path.clone(), tombstone);
        Ok(())
    }

    pub(crate) fn remove_resource(&mut self, project: ProjectId, path: &ResourcePath) {
        if let Some(entries) = self.resources.get_mut(&project) {
            entries.remove(path);
        }
    }

    pub(crate) fn list_children(&self, project: ProjectId, folder: &ResourcePath) -> Vec<Resource> {
        let mut merged: BTreeMap<&ResourcePath, &Resource> = BTreeMap::new();
        let mut layers = vec![self.online];
        if project != self.online {
            layers.push(project);
        }
        for layer in layers {
            let Some(entries) = self.resources.get(&layer) else {
                continue;
            };
            for (path, resource) in entries {
                if path.parent().as_ref() == Some(folder) {
                    merged.insert(path, resource);
                }
            }
        }
        merged.into_values().map(Resource::header).collect()
    }

    pub(crate) fn list_project_resources(&self, project: ProjectId) -> Vec<Resource> {
        self.resources
            .get(&project)
            .map(|entries| entries.values().map(Resource::header).collect())
            .unwrap_or_default()
    }

    // ── Projects ───────────────────────────────────────────────

    pub(crate) fn read_project(&self, id: ProjectId) -> Option<Project> {
        self.projects.get(&id).cloned()
    }

    pub(crate) fn create_project(&mut self, project: &Project) -> AppResult<Project> {
        if self.projects.contains_key(&project.id) {
            return Err(AppError::conflict(format!(
                "Project {} already exists",
                project.id
            )));
        }
        if self.projects.values().any(|p| p.name == project.name) {
            return Err(AppError::conflict(format!(
                "Project name '{}' already in use",
                project.name
            )));
        }
        let mut stored = project.clone();
        stored.id = ProjectId(assign(&mut self.sequences.project, project.id.get()));
        self.projects.insert(stored.id, stored.clone());
        Ok(stored)
    }

    pub(crate) fn write_project(&mut self, project: &Project) -> AppResult<Project> {
        let Some(slot) = self.projects.get_mut(&project.id) else {
            return Err(AppError::not_found(format!("Project {} not found", project.id)));
        };
        *slot = project.clone();
        Ok(project.clone())
    }

    pub(crate) fn delete_project(&mut self, id: ProjectId) -> AppResult<()> {
        if id == self.online {
            return Err(AppError::validation("The online project cannot be deleted"));
        }
        if self.projects.remove(&id).is_none() {
            return Err(AppError::not_found(format!("Project {id} not found")));
        }
        self.resources.remove(&id);
        Ok(())
    }

    pub(crate) fn list_projects(&self) -> Vec<Project> {
        self.projects.values().cloned().collect()
    }

    // ── Users and groups ───────────────────────────────────────

    pub(crate) fn read_user(&self, name: &str) -> Option<User> {
        self.users.values().find(|u| u.name == name).cloned()
    }

    pub(crate) fn read_user_by_id(&self, id: UserId) -> Option<User> {
        self.users.get(&id).cloned()
    }

    pub(crate) fn create_user(&mut self, user: &User) -> AppResult<User> {
        if self.users.contains_key(&user.id) || self.read_user(&user.name).is_some() {
            return Err(AppError::conflict(format!(
                "User '{}' already exists",
                user.name
            )));
        }
        let mut stored = user.clone();
        stored.id = UserId(assign(&mut self.sequences.user, user.id.get()));
        self.users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    pub(crate) fn write_user(&mut self, user: &User) -> AppResult<User> {
        let renamed_onto_other = self
            .users
            .values()
            .any(|u| u.name == user.name && u.id != user.id);
        if renamed_onto_other {
            return Err(AppError::conflict(format!(
                "User name '{}' already in use",
                user.name
            )));
        }
        let Some(slot) = self.users.get_mut(&user.id) else {
            return Err(AppError::not_found(format!("User {} not found", user.id)));
        };
        *slot = user.clone();
        Ok(user.clone())
    }

    pub(crate) fn delete_user(&mut self, id: UserId) -> AppResult<()> {
        if self.users.remove(&id).is_none() {
            return Err(AppError::not_found(format!("User {id} not found")));
        }
        self.memberships.retain(|(user, _)| *user != id);
        Ok(())
    }

    pub(crate) fn read_group(&self, name: &str) -> Option<Group> {
        self.groups.values().find(|g| g.name == name).cloned()
    }

    pub(crate) fn read_group_by_id(&self, id: GroupId) -> Option<Group> {
        self.groups.get(&id).cloned()
    }

    pub(crate) fn create_group(&mut self, group: &Group) -> AppResult<Group> {
        if self.groups.contains_key(&group.id) || self.read_group(&group.name).is_some() {
            return Err(AppError::conflict(format!(
                "Group '{}' already exists",
                group.name
            )));
        }
        if let Some(parent) = group.parent_id {
            if !self.groups.contains_key(&parent) {
                return Err(AppError::not_found(format!("Parent group {parent} not found")));
            }
        }
        let mut stored = group.clone();
        stored.id = GroupId(assign(&mut self.sequences.group, group.id.get()));
        self.groups.insert(stored.id, stored.clone());
        Ok(stored)
    }

    pub(crate) fn write_group(&mut self, group: &Group) -> AppResult<Group> {
        let Some(slot) = self.groups.get_mut(&group.id) else {
            return Err(AppError::not_found(format!("Group {} not found", group.id)));
        };
        *slot = group.clone();
        Ok(group.clone())
    }

    pub(crate) fn delete_group(&mut self, id: GroupId) -> AppResult<()> {
        if self.groups.values().any(|g| g.parent_id == Some(id)) {
            return Err(AppError::invalid_state(format!(
                "Group {id} still has child groups"
            )));
        }
        if self.groups.remove(&id).is_none() {
            return Err(AppError::not_found(format!("Group {id} not found")));
        }
        self.memberships.retain(|(_, group)| *group != id);
        Ok(())
    }

    pub(crate) fn groups_of_user(&self, user: UserId) -> Vec<Group> {
        self.memberships
            .iter()
            .filter(|(u, _)| *u == user)
            .filter_map(|(_, g)| self.groups.get(g).cloned())
            .collect()
    }

    pub(crate) fn users_of_group(&self, group: GroupId) -> Vec<User> {
        self.memberships
            .iter()
            .filter(|(_, g)| *g == group)
            .filter_map(|(u, _)| self.users.get(u).cloned())
            .collect()
    }

    pub(crate) fn add_user_to_group(&mut self, user: UserId, group: GroupId) -> AppResult<()> {
        if !self.users.contains_key(&user) {
            return Err(AppError::not_found(format!("User {user} not found")));
        }
        if !self.groups.contains_key(&group) {
            return Err(AppError::not_found(format!("Group {group} not found")));
        }
        self.memberships.insert((user, group));
        Ok(())
    }

    pub(crate) fn remove_user_from_group(&mut self, user: UserId, group: GroupId) {
        self.memberships.remove(&(user, group));
    }

    // ── Property definitions ───────────────────────────────────

    pub(crate) fn read_property_definition(
        &self,
        resource_type: ResourceType,
        name: &str,
    ) -> Option<PropertyDefinition> {
        self.properties
            .values()
            .find(|d| d.resource_type == resource_type && d.name == name)
            .cloned()
    }

    pub(crate) fn create_property_definition(
        &mut self,
        definition: &PropertyDefinition,
    ) -> AppResult<PropertyDefinition> {
        if self
            .read_property_definition(definition.resource_type, &definition.name)
            .is_some()
        {
            return Err(AppError::conflict(format!(
                "Property '{}' already defined for {}",
                definition.name, definition.resource_type
            )));
        }
        let mut stored = definition.clone();
        stored.id = PropertyDefinitionId(assign(&mut self.sequences.property, definition.id.get()));
        self.properties.insert(stored.id, stored.clone());
        Ok(stored)
    }

    pub(crate) fn delete_property_definition(&mut self, id: PropertyDefinitionId) -> AppResult<()> {
        match self.properties.remove(&id) {
            Some(_) => Ok(()),
            None => Err(AppError::not_found(format!(
                "Property definition {id} not found"
            ))),
        }
    }

    // ── History ────────────────────────────────────────────────

    pub(crate) fn next_backup_version(&mut self) -> i64 {
        assign(&mut self.sequences.backup, 0)
    }

    pub(crate) fn write_backup(
        &mut self,
        project: &BackupProject,
        resources: &[BackupResource],
    ) -> AppResult<()> {
        if self.backups.contains_key(&project.version()) {
            return Err(AppError::conflict(format!(
                "Backup version {} already written",
                project.version()
            )));
        }
        self.backups
            .insert(project.version(), (project.clone(), resources.to_vec()));
        Ok(())
    }

    pub(crate) fn read_backup_project(&self, version: i64) -> Option<BackupProject> {
        self.backups.get(&version).map(|(p, _)| p.clone())
    }

    pub(crate) fn read_backup_projects(&self) -> Vec<BackupProject> {
        self.backups.values().map(|(p, _)| p.clone()).collect()
    }

    pub(crate) fn read_backup_resources(&self, version: i64) -> Vec<BackupResource> {
        self.backups
            .get(&version)
            .map(|(_, r)| r.clone())
            .unwrap_or_default()
    }
}
