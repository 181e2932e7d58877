//! User and group entity models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use contenthub_core::types::{GroupId, UserId};

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Unique login name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Email address (optional).
    pub email: Option<String>,
    /// Group assigned to resources the user creates.
    pub default_group_id: GroupId,
    /// Disabled users cannot act.
    pub disabled: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// Last successful login time.
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// A new enabled user. The id is assigned by the access module.
    pub fn new(name: impl Into<String>, default_group_id: GroupId) -> Self {
        Self {
            id: UserId(0),
            name: name.into(),
            description: String::new(),
            email: None,
            default_group_id,
            disabled: false,
            created_at: Utc::now(),
            last_login_at: None,
        }
    }
}

/// A group of users. Groups form a tree through `parent_id`; membership
/// in a child group implies membership in every ancestor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Unique group identifier.
    pub id: GroupId,
    /// Unique group name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// The parent group, if any.
    pub parent_id: Option<GroupId>,
}

impl Group {
    /// A new group. The id is assigned by the access module.
    pub fn new(name: impl Into<String>, parent_id: Option<GroupId>) -> Self {
        Self {
            id: GroupId(0),
            name: name.into(),
            description: String::new(),
            parent_id,
        }
    }
}
