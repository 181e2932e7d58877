//! The single authorization layer in front of every broker mutation.
//!
//! Permission bits come in owner, group and public triples. A user is the
//! owner when they own the resource and is in the group when the
//! resource's group is one of their (transitive) groups. Administrators
//! skip the bit checks but still need the lock to write, and `INTERNAL`
//! resources stay hidden from every request not issued by the repository.

use tracing::debug;

use contenthub_core::error::AppError;
use contenthub_core::result::AppResult;
use contenthub_core::types::ProjectId;
use contenthub_entity::{AccessFlags, Project, Resource};

use crate::context::RequestContext;

/// One permission class: read, write, or visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Read,
    Write,
    Visible,
}

impl Permission {
    fn bits(self) -> (AccessFlags, AccessFlags, AccessFlags) {
        match self {
            Self::Read => (
                AccessFlags::OWNER_READ,
                AccessFlags::GROUP_READ,
                AccessFlags::PUBLIC_READ,
            ),
            Self::Write => (
                AccessFlags::OWNER_WRITE,
                AccessFlags::GROUP_WRITE,
                AccessFlags::PUBLIC_WRITE,
            ),
            Self::Visible => (
                AccessFlags::OWNER_VISIBLE,
                AccessFlags::GROUP_VISIBLE,
                AccessFlags::PUBLIC_VISIBLE,
            ),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Visible => "view",
        }
    }
}

/// Checks access flags, project writability, and lock ownership.
#[derive(Debug, Clone)]
pub struct AccessGuard {
    online_project_id: ProjectId,
}

impl AccessGuard {
    /// Creates a guard for a repository whose online project is `online`.
    pub fn new(online_project_id: ProjectId) -> Self {
        Self { online_project_id }
    }

    /// The published project.
    pub fn online_project_id(&self) -> ProjectId {
        self.online_project_id
    }

    /// Whether `ctx` holds `permission` on `resource`.
    pub fn permits(&self, ctx: &RequestContext, resource: &Resource, permission: Permission) -> bool {
        if resource.access_flags.is_internal() && !ctx.internal {
            return false;
        }
        if ctx.is_admin || ctx.internal {
            return true;
        }
        let flags = resource.access_flags;
        let (owner, group, public) = permission.bits();
        (resource.owner_id == ctx.user_id && flags.contains(owner))
            || (ctx.in_group(resource.group_id) && flags.contains(group))
            || flags.contains(public)
    }

    /// Fail with an authorization error unless `ctx` holds `permission`.
    pub fn require(
        &self,
        ctx: &RequestContext,
        resource: &Resource,
        permission: Permission,
    ) -> AppResult<()> {
        if self.permits(ctx, resource, permission) {
            return Ok(());
        }
        debug!(
            user_id = %ctx.user_id,
            path = %resource.path,
            permission = permission.as_str(),
            "Access denied"
        );
        Err(AppError::authorization(format!(
            "User '{}' may not {} {}",
            ctx.username,
            permission.as_str(),
            resource.path
        )))
    }

    /// Resources can only change inside an unlocked offline project.
    pub fn require_writable_project(&self, project: &Project) -> AppResult<()> {
        if project.id == self.online_project_id {
            return Err(AppError::invalid_state(
                "The online project cannot be modified directly",
            ));
        }
        if !project.flags.is_writable() {
            return Err(AppError::invalid_state(format!(
                "Project '{}' is {}",
                project.name, project.flags
            )));
        }
        Ok(())
    }

    /// Writes require the acting user to hold the resource lock.
    pub fn require_lock_holder(&self, ctx: &RequestContext, resource: &Resource) -> AppResult<()> {
        match resource.locked_by {
            Some(holder) if holder == ctx.user_id => Ok(()),
            Some(holder) => Err(AppError::lock_conflict(format!(
                "{} is locked by user {holder}",
                resource.path
            ))),
            None => Err(AppError::lock_conflict(format!(
                "{} must be locked before it is modified",
                resource.path
            ))),
        }
    }

    /// Administrative operations.
    pub fn require_admin(&self, ctx: &RequestContext) -> AppResult<()> {
        if ctx.is_admin || ctx.internal {
            Ok(())
        } else {
            Err(AppError::authorization(format!(
                "User '{}' is not an administrator",
                ctx.username
            )))
        }
    }
}
