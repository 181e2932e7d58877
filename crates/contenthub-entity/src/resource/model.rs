//! Resource entity model.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use contenthub_core::types::{GroupId, ProjectId, ResourceId, UserId};

use super::flags::AccessFlags;
use super::path::ResourcePath;
use super::state::ResourceState;
use super::types::ResourceType;

/// File-or-folder discriminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ResourceKind {
    /// A container for other resources.
    Folder,
    /// A leaf carrying bytes. `content` is `None` when only the header
    /// was read.
    File { content: Option<Bytes> },
}

/// One version of a file or folder as seen from a single project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Identifier assigned by the access module (`0` until created).
    pub id: ResourceId,
    /// Absolute path, unique within a project.
    pub path: ResourcePath,
    /// How the content is interpreted.
    pub resource_type: ResourceType,
    /// The owning user.
    pub owner_id: UserId,
    /// The owning group.
    pub group_id: GroupId,
    /// The project this version belongs to.
    pub project_id: ProjectId,
    /// Owner/group/public permission bits.
    pub access_flags: AccessFlags,
    /// When the resource was first created.
    pub created_at: DateTime<Utc>,
    /// When the resource was last modified.
    pub modified_at: DateTime<Utc>,
    /// Who modified the resource last.
    pub modified_by: UserId,
    /// The user holding the exclusive write lock, if any.
    pub locked_by: Option<UserId>,
    /// Content length in bytes (`0` for folders).
    pub length: u64,
    /// Lifecycle state of this version.
    pub state: ResourceState,
    /// File or folder.
    pub kind: ResourceKind,
}

impl Resource {
    /// A new folder in `project_id`, in state `New`.
    pub fn new_folder(
        path: ResourcePath,
        owner_id: UserId,
        group_id: GroupId,
        project_id: ProjectId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ResourceId(0),
            path,
            resource_type: ResourceType::Folder,
            owner_id,
            group_id,
            project_id,
            access_flags: AccessFlags::default(),
            created_at: now,
            modified_at: now,
            modified_by: owner_id,
            locked_by: None,
            length: 0,
            state: ResourceState::New,
            kind: ResourceKind::Folder,
        }
    }

    /// A new file in `project_id`, in state `New`.
    pub fn new_file(
        path: ResourcePath,
        resource_type: ResourceType,
        content: Bytes,
        owner_id: UserId,
        group_id: GroupId,
        project_id: ProjectId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ResourceId(0),
            path,
            resource_type,
            owner_id,
            group_id,
            project_id,
            access_flags: AccessFlags::default(),
            created_at: now,
            modified_at: now,
            modified_by: owner_id,
            locked_by: None,
            length: content.len() as u64,
            state: ResourceState::New,
            kind: ResourceKind::File {
                content: Some(content),
            },
        }
    }

    /// Whether this resource is a folder.
    pub fn is_folder(&self) -> bool {
        matches!(self.kind, ResourceKind::Folder)
    }

    /// Whether this resource is a file.
    pub fn is_file(&self) -> bool {
        matches!(self.kind, ResourceKind::File { .. })
    }

    /// The loaded content, if this is a file whose content was read.
    pub fn content(&self) -> Option<&Bytes> {
        match &self.kind {
            ResourceKind::File { content } => content.as_ref(),
            ResourceKind::Folder => None,
        }
    }

    /// Replace the content of a file and update its length.
    ///
    /// Has no effect on folders.
    pub fn set_content(&mut self, bytes: Bytes) {
        if let ResourceKind::File { content } = &mut self.kind {
            self.length = bytes.len() as u64;
            *content = Some(bytes);
        }
    }

    /// A copy without content; the shape stored in header caches.
    pub fn header(&self) -> Self {
        let mut header = self.clone();
        if let ResourceKind::File { content } = &mut header.kind {
            *content = None;
        }
        header
    }

    /// Whether any user holds the lock.
    pub fn is_locked(&self) -> bool {
        self.locked_by.is_some()
    }

    /// Whether `user` holds the lock.
    pub fn is_locked_by(&self, user: UserId) -> bool {
        self.locked_by == Some(user)
    }

    /// Whether the resource is tombstoned.
    pub fn is_deleted(&self) -> bool {
        self.state == ResourceState::Deleted
    }

    /// The path as shown to users: folders carry a trailing separator.
    pub fn display_path(&self) -> String {
        if self.is_folder() && !self.path.is_root() {
            format!("{}{}", self.path, ResourcePath::SEPARATOR)
        } else {
            self.path.to_string()
        }
    }
}
