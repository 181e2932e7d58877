//! File operations.

use bytes::Bytes;
use chrono::Utc;
use tracing::info;

use contenthub_core::error::AppError;
use contenthub_core::result::AppResult;
use contenthub_core::types::ResourceId;
use contenthub_entity::{Resource, ResourcePath, ResourceState, ResourceType, Transition};

use super::{Fill, ResourceBroker};
use crate::context::RequestContext;
use crate::guard::Permission;

impl ResourceBroker {
    /// Creates a new file in the acting project. The file starts `New` and
    /// locked by its creator.
    pub async fn create_file(
        &self,
        ctx: &RequestContext,
        path: &ResourcePath,
        resource_type: ResourceType,
        content: Bytes,
    ) -> AppResult<Resource> {
        if resource_type.is_folder() {
            return Err(AppError::validation(format!(
                "{path}: files cannot have the folder type"
            )));
        }
        let project = self.writable_project(ctx).await?;
        let parent = self.writable_parent(ctx, path).await?;

        let _write = self.locks.write(path).await;
        if self.fetch(project.id, path).await?.is_some() {
            return Err(AppError::conflict(format!(
                "{path} already exists in project {}",
                project.id
            )));
        }
        let mut file = Resource::new_file(
            path.clone(),
            resource_type,
            content,
            ctx.user_id,
            ctx.default_group_id,
            project.id,
        );
        file.access_flags = parent.access_flags;
        file.locked_by = Some(ctx.user_id);

        let created = self
            .timeout
            .run("create_resource", self.access.create_resource(project.id, &file))
            .await?;
        self.caches.resources().invalidate(path, project.id);
        info!(
            user_id = %ctx.user_id,
            project_id = %project.id,
            path = %path,
            length = created.length,
            "File created"
        );
        Ok(created)
    }

    /// Reads the header of a file. Tombstoned files are reported missing.
    ///
    /// Only file headers are cached here; a folder found at `path` is
    /// returned fresh and any cached copy of it is dropped.
    pub async fn read_file_header(
        &self,
        ctx: &RequestContext,
        path: &ResourcePath,
    ) -> AppResult<Resource> {
        let header = self.lookup(ctx.project_id, path, Fill::Files).await?;
        if header.is_deleted() {
            return Err(AppError::not_found(format!("{path} has been deleted")));
        }
        self.guard.require(ctx, &header, Permission::Read)?;
        Ok(header)
    }

    /// Reads a file including its content. Content is never cached.
    pub async fn read_file(&self, ctx: &RequestContext, path: &ResourcePath) -> AppResult<Resource> {
        let file = self
            .timeout
            .run(
                "read_file_content",
                self.access.read_file_content(ctx.project_id, path),
            )
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("{path} not found in project {}", ctx.project_id))
            })?;
        if !file.is_file() {
            return Err(AppError::validation(format!(
                "{} is a folder",
                file.display_path()
            )));
        }
        if file.is_deleted() {
            return Err(AppError::not_found(format!("{path} has been deleted")));
        }
        self.guard.require(ctx, &file, Permission::Read)?;
        Ok(file)
    }

    /// Writes the header of a file held locked by the acting user.
    ///
    /// With `changed` the file becomes `Changed` (or stays `New`).
    pub async fn write_file_header(
        &self,
        ctx: &RequestContext,
        file: &Resource,
        changed: bool,
    ) -> AppResult<Resource> {
        self.write_header(ctx, file, changed, false).await
    }

    /// Writes header and content of a file held locked by the acting user.
    pub async fn write_file(&self, ctx: &RequestContext, file: &Resource) -> AppResult<Resource> {
        let content = file
            .content()
            .cloned()
            .ok_or_else(|| AppError::validation(format!("{}: no content to write", file.path)))?;
        let project = self.writable_project(ctx).await?;
        let path = &file.path;
        let _write = self.locks.write(path).await;
        let current = self.locked_for_write(ctx, path).await?;
        if !current.is_file() {
            return Err(AppError::validation(format!(
                "{} is a folder",
                current.display_path()
            )));
        }

        let mut next = file.clone();
        next.id = current.id;
        next.project_id = project.id;
        next.locked_by = current.locked_by;
        next.created_at = current.created_at;
        next.state = current.state.after_modify()?;
        next.modified_at = Utc::now();
        next.modified_by = ctx.user_id;
        next.set_content(content);

        let written = self
            .timeout
            .run("write_resource", self.access.write_resource(project.id, &next))
            .await?;
        self.caches.resources().invalidate(path, project.id);
        info!(
            user_id = %ctx.user_id,
            project_id = %project.id,
            path = %path,
            length = written.length,
            state = %written.state,
            "File written"
        );
        Ok(written)
    }

    /// Soft-deletes a file. A file that was never published is purged.
    pub async fn delete_file(&self, ctx: &RequestContext, path: &ResourcePath) -> AppResult<()> {
        let project = self.writable_project(ctx).await?;
        let _write = self.locks.write(path).await;
        let current = self.locked_for_write(ctx, path).await?;
        if !current.is_file() {
            return Err(AppError::validation(format!(
                "{} is a folder",
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
            "File deleted"
        );
        Ok(())
    }

    /// Lifts the tombstone of a file or folder; it becomes `Changed`.
    pub async fn undelete_resource(
        &self,
        ctx: &RequestContext,
        path: &ResourcePath,
    ) -> AppResult<Resource> {
        let project = self.writable_project(ctx).await?;
        let _write = self.locks.write(path).await;
        let current = self.locked_for_write(ctx, path).await?;
        let mut next = current.header();
        next.state = current.state.after_undelete()?;
        next.modified_at = Utc::now();
        next.modified_by = ctx.user_id;
        let written = self.store_header(project.id, &next).await?;
        self.caches.resources().invalidate(path, project.id);
        info!(user_id = %ctx.user_id, project_id = %project.id, path = %path, "Resource undeleted");
        Ok(written)
    }

    /// Destroys the acting project's entry for a file outright, bypassing
    /// the lifecycle. Every project's cached view of the path is dropped.
    pub async fn remove_file(&self, ctx: &RequestContext, path: &ResourcePath) -> AppResult<()> {
        let project = self.writable_project(ctx).await?;
        let _write = self.locks.write(path).await;
        let current = self.locked_for_write(ctx, path).await?;
        if !current.is_file() {
            return Err(AppError::validation(format!(
                "{} is a folder",
                current.display_path()
            )));
        }
        self.timeout
            .run("remove_resource", self.access.remove_resource(project.id, path))
            .await?;
        self.caches.resources().remove(path);
        info!(user_id = %ctx.user_id, project_id = %project.id, path = %path, "File removed");
        Ok(())
    }

    /// Moves a locked file to `destination`.
    ///
    /// The destination is created `New` with the source's content and the
    /// source is retired like a delete. Cached views of the source path are
    /// dropped for every project.
    pub async fn rename_file(
        &self,
        ctx: &RequestContext,
        source: &ResourcePath,
        destination: &ResourcePath,
    ) -> AppResult<Resource> {
        if source == destination {
            return Err(AppError::validation("Source and destination are the same path"));
        }
        let project = self.writable_project(ctx).await?;
        self.writable_parent(ctx, destination).await?;

        let _write = self.locks.write_many([source, destination]).await;
        let current = self.locked_for_write(ctx, source).await?;
        if !current.is_file() {
            return Err(AppError::validation(format!(
                "{} is a folder",
                current.display_path()
            )));
        }
        if current.is_deleted() {
            return Err(AppError::invalid_state(format!("{source} has been deleted")));
        }
        if self.fetch(project.id, destination).await?.is_some() {
            return Err(AppError::conflict(format!(
                "{destination} already exists in project {}",
                project.id
            )));
        }
        let full = self
            .timeout
            .run(
                "read_file_content",
                self.access.read_file_content(project.id, source),
            )
            .await?
            .ok_or_else(|| AppError::not_found(format!("{source} not found")))?;

        let now = Utc::now();
        let mut moved = full.clone();
        moved.id = ResourceId(0);
        moved.path = destination.clone();
        moved.project_id = project.id;
        moved.state = ResourceState::New;
        moved.locked_by = Some(ctx.user_id);
        moved.created_at = now;
        moved.modified_at = now;
        moved.modified_by = ctx.user_id;

        let created = self
            .timeout
            .run("create_resource", self.access.create_resource(project.id, &moved))
            .await?;
        self.retire(project.id, &current).await?;

        let cache = self.caches.resources();
        cache.remove(source);
        cache.invalidate(destination, project.id);
        info!(
            user_id = %ctx.user_id,
            project_id = %project.id,
            from = %source,
            to = %destination,
            "File renamed"
        );
        Ok(created)
    }
}
