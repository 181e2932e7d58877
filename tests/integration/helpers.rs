//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use bytes::Bytes;

use contenthub_access::{AccessModule, MemoryAccessModule};
use contenthub_core::config::AppConfig;
use contenthub_core::types::{GroupId, ProjectId};
use contenthub_entity::{Group, Project, Resource, ResourcePath, User};
use contenthub_service::{ContentHub, RequestContext};

/// A fully wired repository over an in-memory access module.
pub struct TestRepo {
    /// The backing store, for fault injection and direct inspection
    pub access: Arc<MemoryAccessModule>,
    /// The brokers under test
    pub hub: ContentHub,
    /// Internal administrator context in the online project
    pub admin: RequestContext,
    /// Group every test user belongs to; owns the root folder
    pub editors: Group,
}

impl TestRepo {
    /// Create a repository with default configuration
    pub async fn new() -> Self {
        Self::with_config(AppConfig::default()).await
    }

    /// Create a repository with `config`
    pub async fn with_config(config: AppConfig) -> Self {
        let online = ProjectId(config.repository.online_project_id);
        let access = Arc::new(MemoryAccessModule::new(online));
        let hub = ContentHub::new(&config, access.clone());
        let admin = hub.bootstrap("admin").await.expect("Failed to bootstrap");

        let editors = hub
            .principals()
            .add_group(&admin, &Group::new("Editors", None))
            .await
            .expect("Failed to create editors group");

        let mut root = access
            .read_resource(online, &ResourcePath::root())
            .await
            .expect("Failed to read root")
            .expect("Root folder missing");
        root.group_id = editors.id;
        access
            .write_resource(online, &root)
            .await
            .expect("Failed to hand root to editors");
        hub.caches().clear_all();

        Self {
            access,
            hub,
            admin,
            editors,
        }
    }

    /// The online project id
    pub fn online(&self) -> ProjectId {
        self.hub.online_project_id()
    }

    /// Open an offline project worked on by the editors
    pub async fn project(&self, name: &str) -> Project {
        self.hub
            .projects()
            .create_project(&self.admin, name, "", self.editors.id, self.editors.id)
            .await
            .expect("Failed to create project")
    }

    /// Create a user in the editors group and in `extra` groups
    pub async fn user(&self, name: &str, extra: &[GroupId]) -> User {
        let user = self
            .hub
            .principals()
            .add_user(&self.admin, &User::new(name, self.editors.id))
            .await
            .expect("Failed to create user");
        for group in std::iter::once(&self.editors.id).chain(extra) {
            self.hub
                .principals()
                .add_user_to_group(&self.admin, user.id, *group)
                .await
                .expect("Failed to add membership");
        }
        user
    }

    /// Create an editor and return their context in `project`
    pub async fn editor(&self, name: &str, project: ProjectId) -> RequestContext {
        self.user(name, &[]).await;
        self.ctx(name, project).await
    }

    /// Request context of an existing user in `project`
    pub async fn ctx(&self, name: &str, project: ProjectId) -> RequestContext {
        self.hub
            .principals()
            .context_for(name, project)
            .await
            .expect("Failed to build context")
    }

    /// Create `path` as a plain file with `body` in the context's project
    pub async fn file(&self, ctx: &RequestContext, raw: &str, body: &'static [u8]) -> Resource {
        self.hub
            .resources()
            .create_file(
                ctx,
                &path(raw),
                contenthub_entity::ResourceType::Plain,
                Bytes::from_static(body),
            )
            .await
            .expect("Failed to create file")
    }

    /// Create `path` as a folder in the context's project
    pub async fn folder(&self, ctx: &RequestContext, raw: &str) -> Resource {
        self.hub
            .resources()
            .create_folder(ctx, &path(raw))
            .await
            .expect("Failed to create folder")
    }

    /// Publish the context's project
    pub async fn publish(&self, ctx: &RequestContext) {
        self.hub
            .resources()
            .publish_project(ctx)
            .await
            .expect("Failed to publish");
    }
}

/// Parse an absolute path
pub fn path(raw: &str) -> ResourcePath {
    ResourcePath::parse(raw).expect("Invalid path")
}
