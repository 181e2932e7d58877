//! Cache-aware project access.

use std::sync::Arc;

use tracing::{debug, info};

use contenthub_access::AccessModule;
use contenthub_cache::{CacheManager, KeyLocks};
use contenthub_core::error::AppError;
use contenthub_core::result::AppResult;
use contenthub_core::types::{GroupId, ProjectId};
use contenthub_entity::{BackupProject, BackupResource, Project};

use crate::context::RequestContext;
use crate::guard::AccessGuard;
use crate::timeout::CallTimeout;
use crate::user::UserGroupBroker;

/// Read-through project cache keyed by project id.
#[derive(Debug)]
pub struct ProjectBroker {
    access: Arc<dyn AccessModule>,
    caches: Arc<CacheManager>,
    principals: Arc<UserGroupBroker>,
    guard: AccessGuard,
    timeout: CallTimeout,
    /// Orders project fills against project writes.
    project_locks: KeyLocks,
    /// Shared with the resource broker; taken whole to clear the resource cache.
    resource_locks: Arc<KeyLocks>,
}

impl ProjectBroker {
    /// Creates a new project broker.
    pub fn new(
        access: Arc<dyn AccessModule>,
        caches: Arc<CacheManager>,
        principals: Arc<UserGroupBroker>,
        guard: AccessGuard,
        timeout: CallTimeout,
        resource_locks: Arc<KeyLocks>,
    ) -> Self {
        let project_locks = KeyLocks::new(resource_locks.stripes());
        Self {
            access,
            caches,
            principals,
            guard,
            timeout,
            project_locks,
            resource_locks,
        }
    }

    /// The published project.
    pub async fn online_project(&self) -> AppResult<Project> {
        self.read_project(self.guard.online_project_id()).await
    }

    /// Reads a project by id.
    pub async fn read_project(&self, id: ProjectId) -> AppResult<Project> {
        let _fill = self.project_locks.read(&id).await;
        let cache = self.caches.projects();
        if let Some(project) = cache.get(&id) {
            debug!(project_id = %id, "Project cache hit");
            return Ok(project);
        }
        let project = self
            .timeout
            .run("read_project", self.access.read_project(id))
            .await?
            .ok_or_else(|| AppError::not_found(format!("Project {id} not found")))?;
        cache.put(id, &project);
        Ok(project)
    }

    /// Every project, online first. Not cached.
    pub async fn read_all_projects(&self) -> AppResult<Vec<Project>> {
        let online = self.guard.online_project_id();
        let mut projects = self
            .timeout
            .run("list_projects", self.access.list_projects())
            .await?;
        projects.sort_by_key(|p| (p.id != online, p.id));
        Ok(projects)
    }

    /// Opens a new offline project owned by the acting user.
    pub async fn create_project(
        &self,
        ctx: &RequestContext,
        name: &str,
        description: &str,
        group_id: GroupId,
        manager_group_id: GroupId,
    ) -> AppResult<Project> {
        self.guard.require_admin(ctx)?;
        if name.trim().is_empty() {
            return Err(AppError::validation("Project name must not be empty"));
        }
        let project = Project::new(name, description, ctx.user_id, group_id, manager_group_id);
        let created = self
            .timeout
            .run("create_project", self.access.create_project(&project))
            .await?;
        self.caches.projects().remove(&created.id);
        info!(project_id = %created.id, name = %created.name, "Project created");
        Ok(created)
    }

    /// Writes project attributes. Requires administrator rights or
    /// membership in the project's manager group.
    pub async fn write_project(&self, ctx: &RequestContext, project: &Project) -> AppResult<Project> {
        if !ctx.is_admin && !ctx.internal {
            let current = self.read_project(project.id).await?;
            if !self
                .principals
                .is_manager_of_project(ctx.user_id, &current)
                .await?
            {
                return Err(AppError::authorization(format!(
                    "User '{}' does not manage project '{}'",
                    ctx.username, current.name
                )));
            }
        }
        self.store_project(project).await
    }

    /// Write through to the access module, then invalidate.
    pub(crate) async fn store_project(&self, project: &Project) -> AppResult<Project> {
        let _write = self.project_locks.write(&project.id).await;
        let written = self
            .timeout
            .run("write_project", self.access.write_project(project))
            .await?;
        self.caches.projects().remove(&project.id);
        debug!(project_id = %project.id, flags = %written.flags, "Project written");
        Ok(written)
    }

    /// Deletes an offline project and every resource version it holds.
    ///
    /// The resource cache is cleared as a whole instead of enumerating the
    /// project's paths.
    pub async fn delete_project(&self, ctx: &RequestContext, id: ProjectId) -> AppResult<()> {
        self.guard.require_admin(ctx)?;
        if id == self.guard.online_project_id() {
            return Err(AppError::invalid_state("The online project cannot be deleted"));
        }
        let _write = self.project_locks.write(&id).await;
        let _resources = self.resource_locks.write_all().await;
        self.timeout
            .run("delete_project", self.access.delete_project(id))
            .await?;
        self.caches.projects().remove(&id);
        self.caches.resources().clear();
        info!(project_id = %id, "Project deleted");
        Ok(())
    }

    // ── History ────────────────────────────────────────────────

    /// Reads the backup written by publish number `version`.
    pub async fn read_backup_project(&self, version: i64) -> AppResult<BackupProject> {
        self.timeout
            .run("read_backup_project", self.access.read_backup_project(version))
            .await?
            .ok_or_else(|| AppError::not_found(format!("Backup version {version} not found")))
    }

    /// Every backup, oldest first.
    pub async fn read_backup_projects(&self) -> AppResult<Vec<BackupProject>> {
        self.timeout
            .run("read_backup_projects", self.access.read_backup_projects())
            .await
    }

    /// The resource versions captured by publish number `version`.
    pub async fn read_backup_resources(&self, version: i64) -> AppResult<Vec<BackupResource>> {
        self.timeout
            .run(
                "read_backup_resources",
                self.access.read_backup_resources(version),
            )
            .await
    }
}
