//! Project entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use contenthub_core::types::{GroupId, ProjectId, TaskId, UserId};

/// Lock state of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectFlags {
    /// Open for modification.
    Unlocked,
    /// Temporarily frozen (e.g. while being published).
    Locked,
    /// Closed for good; read-only history.
    Archived,
}

impl ProjectFlags {
    /// Whether resources in the project may be modified.
    pub fn is_writable(&self) -> bool {
        matches!(self, Self::Unlocked)
    }

    /// Return the flag as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unlocked => "unlocked",
            Self::Locked => "locked",
            Self::Archived => "archived",
        }
    }
}

impl fmt::Display for ProjectFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An isolation and versioning unit.
///
/// Exactly one project is the online project; every other project is an
/// offline working copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Unique project identifier.
    pub id: ProjectId,
    /// Project name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// The user who created the project.
    pub owner_id: UserId,
    /// The group whose members work in the project.
    pub group_id: GroupId,
    /// The group whose members may publish the project.
    pub manager_group_id: GroupId,
    /// Workflow task tracking the project, if any.
    pub task_id: Option<TaskId>,
    /// Lock state.
    pub flags: ProjectFlags,
    /// When the project was created.
    pub created_at: DateTime<Utc>,
    /// When the project was last published.
    pub published_at: Option<DateTime<Utc>>,
    /// Who published the project last.
    pub published_by: Option<UserId>,
}

impl Project {
    /// A new, unlocked project. The id is assigned by the access module.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        owner_id: UserId,
        group_id: GroupId,
        manager_group_id: GroupId,
    ) -> Self {
        Self {
            id: ProjectId(0),
            name: name.into(),
            description: description.into(),
            owner_id,
            group_id,
            manager_group_id,
            task_id: None,
            flags: ProjectFlags::Unlocked,
            created_at: Utc::now(),
            published_at: None,
            published_by: None,
        }
    }
}
