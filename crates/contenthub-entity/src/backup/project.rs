//! Backup snapshot of a published project.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use contenthub_core::types::{GroupId, ProjectId, TaskId, UserId};

use crate::project::Project;
use crate::resource::ResourcePath;
use crate::user::User;

/// Denormalized principal names captured with a project snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectNames {
    /// Name of the project owner.
    pub owner: String,
    /// Name of the project group.
    pub group: String,
    /// Name of the manager group.
    pub manager_group: String,
}

/// A project as it was when it got published.
///
/// Fields are private: a snapshot is never mutated after capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupProject {
    snapshot_id: Uuid,
    version: i64,
    project_id: ProjectId,
    name: String,
    description: String,
    task_id: Option<TaskId>,
    owner_id: UserId,
    owner_name: String,
    group_id: GroupId,
    group_name: String,
    manager_group_id: GroupId,
    manager_group_name: String,
    published_at: DateTime<Utc>,
    published_by: UserId,
    publisher_name: String,
    resources: Vec<ResourcePath>,
}

impl BackupProject {
    /// Capture `project` as published by `publisher`.
    pub fn capture(
        version: i64,
        project: &Project,
        publisher: &User,
        names: ProjectNames,
        resources: Vec<ResourcePath>,
        published_at: DateTime<Utc>,
    ) -> Self {
        Self {
            snapshot_id: Uuid::now_v7(),
            version,
            project_id: project.id,
            name: project.name.clone(),
            description: project.description.clone(),
            task_id: project.task_id,
            owner_id: project.owner_id,
            owner_name: names.owner,
            group_id: project.group_id,
            group_name: names.group,
            manager_group_id: project.manager_group_id,
            manager_group_name: names.manager_group,
            published_at,
            published_by: publisher.id,
            publisher_name: publisher.name.clone(),
            resources,
        }
    }

    pub fn snapshot_id(&self) -> Uuid {
        self.snapshot_id
    }

    /// Backup version; increases with every publish.
    pub fn version(&self) -> i64 {
        self.version
    }

    pub fn project_id(&self) -> ProjectId {
        self.project_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn task_id(&self) -> Option<TaskId> {
        self.task_id
    }

    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    pub fn owner_name(&self) -> &str {
        &self.owner_name
    }

    pub fn group_id(&self) -> GroupId {
        self.group_id
    }

    pub fn group_name(&self) -> &str {
        &self.group_name
    }

    pub fn manager_group_id(&self) -> GroupId {
        self.manager_group_id
    }

    pub fn manager_group_name(&self) -> &str {
        &self.manager_group_name
    }

    pub fn published_at(&self) -> DateTime<Utc> {
        self.published_at
    }

    pub fn published_by(&self) -> UserId {
        self.published_by
    }

    pub fn publisher_name(&self) -> &str {
        &self.publisher_name
    }

    /// Paths of every resource the publish touched, deletions included.
    pub fn resources(&self) -> &[ResourcePath] {
        &self.resources
    }
}
