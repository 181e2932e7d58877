//! Request context carrying the acting user and the project they work in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use contenthub_core::types::{GroupId, ProjectId, UserId};
use contenthub_entity::User;

/// Context for the current request.
///
/// Built once per request (see
/// [`UserGroupBroker::context_for`](crate::UserGroupBroker::context_for))
/// and passed into every broker call so that each operation knows *who* is
/// acting and in *which* project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// Correlates log lines of one request.
    pub request_id: Uuid,
    /// The acting user's ID.
    pub user_id: UserId,
    /// The acting user's name.
    pub username: String,
    /// Group assigned to resources the user creates.
    pub default_group_id: GroupId,
    /// Every group the user belongs to, including inherited ones.
    pub group_ids: Vec<GroupId>,
    /// The project the request works in.
    pub project_id: ProjectId,
    /// Whether the user is an administrator.
    pub is_admin: bool,
    /// Set for requests issued by the repository itself rather than a user.
    pub internal: bool,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user: &User, project_id: ProjectId, group_ids: Vec<GroupId>, is_admin: bool) -> Self {
        Self {
            request_id: Uuid::now_v7(),
            user_id: user.id,
            username: user.name.clone(),
            default_group_id: user.default_group_id,
            group_ids,
            project_id,
            is_admin,
            internal: false,
            request_time: Utc::now(),
        }
    }

    /// The same user working in another project.
    pub fn in_project(&self, project_id: ProjectId) -> Self {
        Self {
            request_id: Uuid::now_v7(),
            project_id,
            request_time: Utc::now(),
            ..self.clone()
        }
    }

    /// Mark the request as issued by the repository itself.
    pub fn into_internal(mut self) -> Self {
        self.internal = true;
        self
    }

    /// Returns whether the user belongs to `group`.
    pub fn in_group(&self, group: GroupId) -> bool {
        self.group_ids.contains(&group)
    }
}
