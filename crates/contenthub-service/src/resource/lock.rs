//! Per-resource exclusive write locks.

use tracing::{info, warn};

use contenthub_core::error::AppError;
use contenthub_core::result::AppResult;
use contenthub_entity::{Resource, ResourcePath};

use super::ResourceBroker;
use crate::context::RequestContext;
use crate::guard::Permission;

impl ResourceBroker {
    /// Locks a resource for the acting user. Locking a resource the user
    /// already holds is a no-op; administrators may take over a lock.
    pub async fn lock_resource(&self, ctx: &RequestContext, path: &ResourcePath) -> AppResult<Resource> {
        let project = self.writable_project(ctx).await?;
        let _write = self.locks.write(path).await;
        let current = self.fetch_existing(project.id, path).await?;
        self.guard.require(ctx, &current, Permission::Write)?;

        match current.locked_by {
            Some(holder) if holder == ctx.user_id => return Ok(current),
            Some(holder) if !ctx.is_admin => {
                return Err(AppError::lock_conflict(format!(
                    "{path} is already locked by user {holder}"
                )));
            }
            Some(holder) => {
                warn!(
                    user_id = %ctx.user_id,
                    previous_holder = %holder,
                    path = %path,
                    "Administrator took over resource lock"
                );
            }
            None => {}
        }

        let mut next = current.header();
        next.locked_by = Some(ctx.user_id);
        let written = self.store_header(project.id, &next).await?;
        self.caches.resources().invalidate(path, project.id);
        info!(user_id = %ctx.user_id, project_id = %project.id, path = %path, "Resource locked");
        Ok(written)
    }

    /// Releases the lock on a resource (lock holder or administrator).
    pub async fn unlock_resource(&self, ctx: &RequestContext, path: &ResourcePath) -> AppResult<Resource> {
        let project = self.writable_project(ctx).await?;
        let _write = self.locks.write(path).await;
        let current = self.fetch_existing(project.id, path).await?;

        match current.locked_by {
            None => return Ok(current),
            Some(holder) if holder != ctx.user_id && !ctx.is_admin => {
                return Err(AppError::lock_conflict(format!(
                    "Only user {holder} or an administrator can unlock {path}"
                )));
            }
            Some(_) => {}
        }

        let mut next = current.header();
        next.locked_by = None;
        let written = self.store_header(project.id, &next).await?;
        self.caches.resources().invalidate(path, project.id);
        info!(user_id = %ctx.user_id, project_id = %project.id, path = %path, "Resource unlocked");
        Ok(written)
    }
}
