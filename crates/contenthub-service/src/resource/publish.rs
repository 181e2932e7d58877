//! Publishing an offline project into the online project.

use chrono::Utc;
use tracing::{info, warn};

use contenthub_core::error::AppError;
use contenthub_core::result::AppResult;
use contenthub_entity::backup::{ProjectNames, ResourceNames};
use contenthub_entity::{
    BackupProject, BackupResource, Project, ProjectFlags, Resource, ResourceState, Transition,
};

use super::ResourceBroker;
use crate::context::RequestContext;

impl ResourceBroker {
    /// Publishes the acting project.
    ///
    /// Every `New` or `Changed` resource is copied into the online project
    /// as `Unchanged`; every `Deleted` one is purged from both projects.
    /// Every entry the offline project held when the listing was taken is
    /// removed from it. The project stays `Locked` while this runs. Returns the backup written
    /// for the publish.
    pub async fn publish_project(&self, ctx: &RequestContext) -> AppResult<BackupProject> {
        let project = self.projects.read_project(ctx.project_id).await?;
        self.guard.require_writable_project(&project)?;
        if !ctx.is_admin
            && !self
                .principals
                .is_manager_of_project(ctx.user_id, &project)
                .await?
        {
            return Err(AppError::authorization(format!(
                "User '{}' may not publish project '{}'",
                ctx.username, project.name
            )));
        }

        let mut locked = project.clone();
        locked.flags = ProjectFlags::Locked;
        let mut project = self.projects.store_project(&locked).await?;

        let outcome = self.publish_entries(ctx, &project).await;

        project.flags = ProjectFlags::Unlocked;
        if let Ok(backup) = &outcome {
            project.published_at = Some(backup.published_at());
            project.published_by = Some(ctx.user_id);
        }
        let restored = self.projects.store_project(&project).await;

        match (outcome, restored) {
            (Ok(backup), Ok(_)) => {
                info!(
                    user_id = %ctx.user_id,
                    project_id = %project.id,
                    version = backup.version(),
                    resources = backup.resources().len(),
                    "Project published"
                );
                Ok(backup)
            }
            (Ok(_), Err(e)) => Err(e),
            (Err(e), restored) => {
                if let Err(restore) = restored {
                    warn!(project_id = %project.id, error = %restore, "Failed to unlock project after failed publish");
                }
                Err(e)
            }
        }
    }

    async fn resource_names(&self, resource: &Resource) -> AppResult<ResourceNames> {
        Ok(ResourceNames {
            owner: self.principals.user_name(resource.owner_id).await?,
            group: self.principals.group_name(resource.group_id).await?,
            last_modified_by: self.principals.user_name(resource.modified_by).await?,
        })
    }

    async fn publish_entries(
        &self,
        ctx: &RequestContext,
        project: &Project,
    ) -> AppResult<BackupProject> {
        let online = self.guard.online_project_id();
        // Every stripe is held until the publish ends. A write admitted
        // before the project was locked either finished before the listing
        // or waits and lands after the publish.
        let _write = self.locks.write_all().await;
        let entries = self
            .timeout
            .run(
                "list_project_resources",
                self.access.list_project_resources(project.id),
            )
            .await?;

        // The user/group broker never takes resource stripes.
        let publisher = self.principals.read_user_by_id(ctx.user_id).await?;
        let project_names = ProjectNames {
            owner: self.principals.user_name(project.owner_id).await?,
            group: self.principals.group_name(project.group_id).await?,
            manager_group: self.principals.group_name(project.manager_group_id).await?,
        };
        let mut promote = Vec::new();
        let mut purge = Vec::new();
        for entry in entries.iter().filter(|e| e.state.is_pending()) {
            let names = self.resource_names(entry).await?;
            match entry.state.after_publish() {
                Transition::Purge => purge.push((entry, names)),
                Transition::To(_) => promote.push((entry, names)),
            }
        }
        // Parents are created before their children and removed after them.
        promote.sort_by_key(|(e, _)| e.path.depth());
        purge.sort_by_key(|(e, _)| std::cmp::Reverse(e.path.depth()));

        let version = self
            .timeout
            .run("next_backup_version", self.access.next_backup_version())
            .await?;

        let mut published = Vec::with_capacity(promote.len() + purge.len());
        let mut snapshots = Vec::with_capacity(promote.len() + purge.len());

        for (entry, names) in promote {
            let full = self.read_full(project, entry).await?;
            snapshots.push(BackupResource::capture(version, &full, names));
            published.push(entry.path.clone());

            let mut copy = full;
            copy.project_id = online;
            copy.state = ResourceState::Unchanged;
            copy.locked_by = None;
            if self.fetch(online, &entry.path).await?.is_some() {
                self.timeout
                    .run("write_resource", self.access.write_resource(online, &copy))
                    .await?;
            } else {
                self.timeout
                    .run("create_resource", self.access.create_resource(online, &copy))
                    .await?;
            }
        }

        for (entry, names) in purge {
            let full = self.read_full(project, entry).await?;
            snapshots.push(BackupResource::capture(version, &full, names));
            published.push(entry.path.clone());
            self.timeout
                .run(
                    "remove_resource",
                    self.access.remove_resource(online, &entry.path),
                )
                .await?;
        }

        let cache = self.caches.resources();
        for entry in &entries {
            self.timeout
                .run(
                    "remove_resource",
                    self.access.remove_resource(project.id, &entry.path),
                )
                .await?;
            cache.remove(&entry.path);
        }

        let backup = BackupProject::capture(
            version,
            project,
            &publisher,
            project_names,
            published,
            Utc::now(),
        );
        self.timeout
            .run("write_backup", self.access.write_backup(&backup, &snapshots))
            .await?;
        Ok(backup)
    }

    async fn read_full(&self, project: &Project, entry: &Resource) -> AppResult<Resource> {
        self.timeout
            .run(
                "read_file_content",
                self.access.read_file_content(project.id, &entry.path),
            )
            .await?
            .ok_or_else(|| {
                AppError::internal(format!(
                    "{} vanished from project {} during publish",
                    entry.path, project.id
                ))
            })
    }
}
