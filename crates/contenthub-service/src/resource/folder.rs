//! Folder operations.

use tracing::info;

use contenthub_core::error::AppError;
use contenthub_core::result::AppResult;
use contenthub_entity::{Resource, ResourcePath, Transition};

use super::{Fill, ResourceBroker};
use crate::context::RequestContext;
use crate::guard::Permission;

impl ResourceBroker {
    /// Creates a new folder in the acting project, `New` and locked by its
    /// creator.
    pub async fn create_folder(&self, ctx: &RequestContext, path: &ResourcePath) -> AppResult<Resource> {
        let project = self.writable_project(ctx).await?;
        let parent = self.writable_parent(ctx, path).await?;

        let _write = self.locks.write(path).await;
        if self.fetch(project.id, path).await?.is_some() {
            return Err(AppError::conflict(format!(
                "{path} already exists in project {}",
                project.id
            )));
        }
        let mut folder = Resource::new_folder(path.clone(), ctx.user_id, ctx.default_group_id, project.id);
        folder.access_flags = parent.access_flags;
        folder.locked_by = Some(ctx.user_id);

        let created = self
            .timeout
            .run("create_resource", self.access.create_resource(project.id, &folder))
            .await?;
        self.caches.resources().invalidate(path, project.id);
        info!(user_id = %ctx.user_id, project_id = %project.id, path = %path, "Folder created");
        Ok(created)
    }

    /// Reads a folder header through the cache.
    pub async fn read_folder(&self, ctx: &RequestContext, path: &ResourcePath) -> AppResult<Resource> {
        let folder = self.lookup(ctx.project_id, path, Fill::Folders).await?;
        if !folder.is_folder() || folder.is_deleted() {
            return Err(AppError::not_found(format!(
                "Folder {path} not found in project {}",
                ctx.project_id
            )));
        }
        self.guard.require(ctx, &folder, Permission::Read)?;
        Ok(folder)
    }

    /// Writes the header of a folder held locked by the acting user.
    pub async fn write_folder(
        &self,
        ctx: &RequestContext,
        folder: &Resource,
        changed: bool,
    ) -> AppResult<Resource> {
        self.write_header(ctx, folder, changed, true).await
    }

    /// Soft-deletes a folder that has no live children.
    pub async fn delete_folder(&self, ctx: &RequestContext, path: &ResourcePath) -> AppResult<()> {
        if path.is_root() {
            return Err(AppError::validation("The root folder cannot be deleted"));
        }
        let project = self.writable_project(ctx).await?;
        let _write = self.locks.write(path).await;
        let current = self.locked_for_write(ctx, path).await?;
        if !current.is_folder() {
            return Err(AppError::validation(format!("{path} is not a folder")));
        }
        let live = self
            .list_children(project.id, path)
            .await?
            .into_iter()
            .filter(|child| !child.is_deleted())
            .count();
        if live > 0 {
            return Err(AppError::invalid_state(format!(
                "{} still contains {live} resource(s)",
                current.display_path()
            )));
        }
        let transition = self.retire(project.id, &current).await?;
        self.caches.resources().invalidate(path, project.id);
        info!(
            user_id = %ctx.user_id,
            project_id = %project.id,
            path = %path,
            purged = transition == Transition::Purge,
            "Folder deleted"
        );
        Ok(())
    }

    /// Destroys the acting project's entry for an empty folder outright.
    pub async fn remove_folder(&self, ctx: &RequestContext, path: &ResourcePath) -> AppResult<()> {
        if path.is_root() {
            return Err(AppError::validation("The root folder cannot be removed"));
        }
        let project = self.writable_project(ctx).await?;
        let _write = self.locks.write(path).await;
        let current = self.locked_for_write(ctx, path).await?;
        if !current.is_folder() {
            return Err(AppError::validation(format!("{path} is not a folder")));
        }
        if !self.list_children(project.id, path).await?.is_empty() {
            return Err(AppError::invalid_state(format!(
                "{} is not empty",
                current.display_path()
            )));
        }
        self.timeout
            .run("remove_resource", self.access.remove_resource(project.id, path))
            .await?;
        self.caches.resources().remove(path);
        info!(user_id = %ctx.user_id, project_id = %project.id, path = %path, "Folder removed");
        Ok(())
    }

    /// Direct sub-folders of `path` the acting user may see.
    pub async fn read_sub_folders(
        &self,
        ctx: &RequestContext,
        path: &ResourcePath,
        include_deleted: bool,
    ) -> AppResult<Vec<Resource>> {
        self.read_folder(ctx, path).await?;
        let children = self.list_children(ctx.project_id, path).await?;
        let folders = children.into_iter().filter(Resource::is_folder).collect();
        Ok(self.visible_children(ctx, folders, include_deleted))
    }

    /// Files directly inside `path` the acting user may see.
    pub async fn read_files_in_folder(
        &self,
        ctx: &RequestContext,
        path: &ResourcePath,
        include_deleted: bool,
    ) -> AppResult<Vec<Resource>> {
        self.read_folder(ctx, path).await?;
        let children = self.list_children(ctx.project_id, path).await?;
        let files = children.into_iter().filter(Resource::is_file).collect();
        Ok(self.visible_children(ctx, files, include_deleted))
    }
}
