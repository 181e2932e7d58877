//! Backup snapshot of a published resource version.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use contenthub_core::types::{GroupId, ProjectId, ResourceId, UserId};

use crate::resource::{AccessFlags, Resource, ResourcePath, ResourceState, ResourceType};

/// Denormalized principal names captured with a resource snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceNames {
    /// Name of the resource owner.
    pub owner: String,
    /// Name of the resource group.
    pub group: String,
    /// Name of the last modifier.
    pub last_modified_by: String,
}

/// One resource version as it was published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupResource {
    version: i64,
    resource_id: ResourceId,
    path: ResourcePath,
    resource_type: ResourceType,
    is_folder: bool,
    project_id: ProjectId,
    owner_id: UserId,
    owner_name: String,
    group_id: GroupId,
    group_name: String,
    access_flags: AccessFlags,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
    modified_by: UserId,
    last_modified_by_name: String,
    state: ResourceState,
    content: Bytes,
}

impl BackupResource {
    /// Capture `resource` (with content, for files) under backup `version`.
    ///
    /// The state recorded is the offline state at publish time, so history
    /// shows whether the version was new, changed, or deleted.
    pub fn capture(version: i64, resource: &Resource, names: ResourceNames) -> Self {
        Self {
            version,
            resource_id: resource.id,
            path: resource.path.clone(),
            resource_type: resource.resource_type,
            is_folder: resource.is_folder(),
            project_id: resource.project_id,
            owner_id: resource.owner_id,
            owner_name: names.owner,
            group_id: resource.group_id,
            group_name: names.group,
            access_flags: resource.access_flags,
            created_at: resource.created_at,
            modified_at: resource.modified_at,
            modified_by: resource.modified_by,
            last_modified_by_name: names.last_modified_by,
            state: resource.state,
            content: resource
                .content()
                .map(|c| Bytes::copy_from_slice(c))
                .unwrap_or_default(),
        }
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    pub fn resource_id(&self) -> ResourceId {
        self.resource_id
    }

    pub fn path(&self) -> &ResourcePath {
        &self.path
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    pub fn is_folder(&self) -> bool {
        self.is_folder
    }

    pub fn project_id(&self) -> ProjectId {
        self.project_id
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

    pub fn access_flags(&self) -> AccessFlags {
        self.access_flags
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }

    pub fn modified_by(&self) -> UserId {
        self.modified_by
    }

    pub fn last_modified_by_name(&self) -> &str {
        &self.last_modified_by_name
    }

    pub fn state(&self) -> ResourceState {
        self.state
    }

    /// Captured content; empty for folders.
    pub fn content(&self) -> &Bytes {
        &self.content
    }
}
