//! Cache-aware file and folder operations.
//!
//! Every read goes through the [`ResourceCache`](contenthub_cache::ResourceCache)
//! under the shared stripe of its path; every write holds the exclusive
//! stripe while it updates the access module and invalidates the cache.
//! Lookups of *other* paths (parents, destinations) happen before a write
//! stripe is taken, and reads made while one is held go straight to the
//! access module, so a task never waits on a stripe it already holds.

mod file;
mod folder;
mod lock;
mod publish;

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use contenthub_access::AccessModule;
use contenthub_cache::{CacheManager, KeyLocks};
use contenthub_core::error::AppError;
use contenthub_core::result::AppResult;
use contenthub_core::types::ProjectId;
use contenthub_entity::{Project, Resource, ResourcePath, Transition};

use crate::context::RequestContext;
use crate::guard::{AccessGuard, Permission};
use crate::project::ProjectBroker;
use crate::timeout::CallTimeout;
use crate::user::UserGroupBroker;

/// Which fetched resources a read-through lookup may store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fill {
    Files,
    Folders,
}

impl Fill {
    fn accepts(self, resource: &Resource) -> bool {
        match self {
            Self::Files => resource.is_file(),
            Self::Folders => resource.is_folder(),
        }
    }
}

/// The cache-aware façade over resources.
#[derive(Debug)]
pub struct ResourceBroker {
    access: Arc<dyn AccessModule>,
    caches: Arc<CacheManager>,
    locks: Arc<KeyLocks>,
    projects: Arc<ProjectBroker>,
    principals: Arc<UserGroupBroker>,
    guard: AccessGuard,
    timeout: CallTimeout,
}

impl ResourceBroker {
    /// Creates a new resource broker.
    pub fn new(
        access: Arc<dyn AccessModule>,
        caches: Arc<CacheManager>,
        locks: Arc<KeyLocks>,
        projects: Arc<ProjectBroker>,
        principals: Arc<UserGroupBroker>,
        guard: AccessGuard,
        timeout: CallTimeout,
    ) -> Self {
        Self {
            access,
            caches,
            locks,
            projects,
            principals,
            guard,
            timeout,
        }
    }

    // ── Access-module calls ────────────────────────────────────

    async fn fetch(&self, project: ProjectId, path: &ResourcePath) -> AppResult<Option<Resource>> {
        let found = self
            .timeout
            .run("read_resource", self.access.read_resource(project, path))
            .await?;
        match found {
            Some(resource) if resource.path != *path => Err(AppError::internal(format!(
                "Access module answered {} for {path}",
                resource.path
            ))),
            other => Ok(other),
        }
    }

    async fn fetch_existing(&self, project: ProjectId, path: &ResourcePath) -> AppResult<Resource> {
        self.fetch(project, path)
            .await?
            .ok_or_else(|| AppError::not_found(format!("{path} not found in project {project}")))
    }

    async fn store_header(&self, project: ProjectId, resource: &Resource) -> AppResult<Resource> {
        self.timeout
            .run(
                "write_resource",
                self.access.write_resource(project, &resource.header()),
            )
            .await
    }

    /// Apply a soft-delete transition. Callers hold the write stripe.
    async fn retire(&self, project: ProjectId, resource: &Resource) -> AppResult<Transition> {
        let transition = resource.state.after_delete()?;
        match transition {
            Transition::Purge => {
                self.timeout
                    .run(
                        "remove_resource",
                        self.access.remove_resource(project, &resource.path),
                    )
                    .await?
            }
            Transition::To(_) => {
                self.timeout
                    .run(
                        "delete_resource",
                        self.access.delete_resource(project, &resource.path),
                    )
                    .await?
            }
        }
        Ok(transition)
    }

    // ── Cache ──────────────────────────────────────────────────

    /// Read-through lookup of `path` in `project`, including tombstones.
    ///
    /// A cached entry of the other kind is dropped and re-read; only
    /// resources of the accepted kind get stored.
    async fn lookup(&self, project: ProjectId, path: &ResourcePath, fill: Fill) -> AppResult<Resource> {
        let cache = self.caches.resources();
        let _fill = self.locks.read(path).await;
        match cache.get(path, project) {
            Some(hit) if fill.accepts(&hit) => {
                debug!(project_id = %project, path = %path, "Resource cache hit");
                Ok(hit)
            }
            stale => {
                if stale.is_some() {
                    cache.invalidate(path, project);
                }
                let fresh = self.fetch_existing(project, path).await?;
                if fill.accepts(&fresh) {
                    cache.put(path, project, &fresh);
                }
                Ok(fresh)
            }
        }
    }

    // ── Preconditions ──────────────────────────────────────────

    /// The acting project, which must accept modifications.
    async fn writable_project(&self, ctx: &RequestContext) -> AppResult<Project> {
        let project = self.projects.read_project(ctx.project_id).await?;
        self.guard.require_writable_project(&project)?;
        Ok(project)
    }

    /// The parent of `path`, which must be a live folder `ctx` may write.
    /// Resolved before any write stripe is taken.
    async fn writable_parent(&self, ctx: &RequestContext, path: &ResourcePath) -> AppResult<Resource> {
        let parent_path = path
            .parent()
            .ok_or_else(|| AppError::validation("The root folder already exists"))?;
        let parent = self.lookup(ctx.project_id, &parent_path, Fill::Folders).await?;
        if !parent.is_folder() || parent.is_deleted() {
            return Err(AppError::not_found(format!(
                "Folder {parent_path} not found in project {}",
                ctx.project_id
            )));
        }
        self.guard.require(ctx, &parent, Permission::Write)?;
        Ok(parent)
    }

    /// The current version of `path`, which `ctx` must hold the lock on
    /// and may write. Callers hold the write stripe.
    async fn locked_for_write(&self, ctx: &RequestContext, path: &ResourcePath) -> AppResult<Resource> {
        let current = self.fetch_existing(ctx.project_id, path).await?;
        self.guard.require_lock_holder(ctx, &current)?;
        self.guard.require(ctx, &current, Permission::Write)?;
        Ok(current)
    }

    /// Header write shared by files and folders.
    ///
    /// Identity, location, and lock are taken from the stored version; the
    /// caller supplies the remaining attributes. With `changed` the state
    /// moves forward through the lifecycle and the modification stamp is
    /// set. Deleted resources are rejected either way.
    async fn write_header(
        &self,
        ctx: &RequestContext,
        resource: &Resource,
        changed: bool,
        expect_folder: bool,
    ) -> AppResult<Resource> {
        let project = self.writable_project(ctx).await?;
        let path = &resource.path;
        let _write = self.locks.write(path).await;
        let current = self.locked_for_write(ctx, path).await?;
        if current.is_folder() != expect_folder {
            return Err(AppError::validation(format!(
                "{} is not a {}",
                current.display_path(),
                if expect_folder { "folder" } else { "file" }
            )));
        }
        if current.is_deleted() {
            return Err(AppError::invalid_state(format!(
                "{} is deleted and must be undeleted before it can be written",
                current.display_path()
            )));
        }
        if resource.resource_type.is_folder() != expect_folder {
            return Err(AppError::validation(format!(
                "{}: type {} does not match a {}",
                current.display_path(),
                resource.resource_type,
                if expect_folder { "folder" } else { "file" }
            )));
        }

        let mut next = resource.header();
        next.id = current.id;
        next.project_id = project.id;
        next.locked_by = current.locked_by;
        next.kind = current.header().kind;
        next.length = current.length;
        next.created_at = current.created_at;
        if changed {
            next.state = current.state.after_modify()?;
            next.modified_at = Utc::now();
            next.modified_by = ctx.user_id;
        } else {
            next.state = current.state;
        }

        let written = self.store_header(project.id, &next).await?;
        self.caches.resources().invalidate(path, project.id);
        info!(
            user_id = %ctx.user_id,
            project_id = %project.id,
            path = %path,
            state = %written.state,
            "Resource header written"
        );
        Ok(written)
    }

    fn visible_children(
        &self,
        ctx: &RequestContext,
        children: Vec<Resource>,
        include_deleted: bool,
    ) -> Vec<Resource> {
        children
            .into_iter()
            .filter(|child| include_deleted || !child.is_deleted())
            .filter(|child| self.guard.permits(ctx, child, Permission::Visible))
            .collect()
    }

    async fn list_children(&self, project: ProjectId, folder: &ResourcePath) -> AppResult<Vec<Resource>> {
        self.timeout
            .run("list_children", self.access.list_children(project, folder))
            .await
    }
}
