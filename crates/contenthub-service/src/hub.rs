//! Wiring of a complete broker set from configuration.

use std::sync::Arc;

use tracing::info;

use contenthub_access::AccessModule;
use contenthub_cache::{CacheManager, KeyLocks};
use contenthub_core::config::AppConfig;
use contenthub_core::result::AppResult;
use contenthub_core::types::ProjectId;
use contenthub_entity::{Group, Project, Resource, ResourcePath, ResourceState, User};

use crate::context::RequestContext;
use crate::guard::AccessGuard;
use crate::project::ProjectBroker;
use crate::property::PropertyBroker;
use crate::resource::ResourceBroker;
use crate::timeout::CallTimeout;
use crate::user::UserGroupBroker;

/// Every broker of one repository, sharing one set of caches.
#[derive(Debug, Clone)]
pub struct ContentHub {
    access: Arc<dyn AccessModule>,
    caches: Arc<CacheManager>,
    online_project_id: ProjectId,
    resources: Arc<ResourceBroker>,
    projects: Arc<ProjectBroker>,
    principals: Arc<UserGroupBroker>,
    properties: Arc<PropertyBroker>,
}

impl ContentHub {
    /// Build the brokers over `access`.
    pub fn new(config: &AppConfig, access: Arc<dyn AccessModule>) -> Self {
        let online = ProjectId(config.repository.online_project_id);
        let caches = Arc::new(CacheManager::new(&config.cache));
        let locks = Arc::new(KeyLocks::new(config.repository.lock_stripes));
        let guard = AccessGuard::new(online);
        let timeout = CallTimeout::from_millis(config.repository.access_timeout_ms);

        let principals = Arc::new(UserGroupBroker::new(
            Arc::clone(&access),
            Arc::clone(&caches),
            guard.clone(),
            timeout,
            config.repository.admin_group.clone(),
        ));
        let projects = Arc::new(ProjectBroker::new(
            Arc::clone(&access),
            Arc::clone(&caches),
            Arc::clone(&principals),
            guard.clone(),
            timeout,
            Arc::clone(&locks),
        ));
        let resources = Arc::new(ResourceBroker::new(
            Arc::clone(&access),
            Arc::clone(&caches),
            locks,
            Arc::clone(&projects),
            Arc::clone(&principals),
            guard.clone(),
            timeout,
        ));
        let properties = Arc::new(PropertyBroker::new(
            Arc::clone(&access),
            Arc::clone(&caches),
            guard,
            timeout,
        ));

        info!(online_project_id = %online, "Content hub initialized");
        Self {
            access,
            caches,
            online_project_id: online,
            resources,
            projects,
            principals,
            properties,
        }
    }

    /// Seed an empty store: the administrators group, an administrator
    /// named `admin`, the online project, and its root folder. Entries that
    /// already exist are kept. Returns an internal context for `admin` in
    /// the online project.
    pub async fn bootstrap(&self, admin: &str) -> AppResult<RequestContext> {
        let admin_group_name = self.principals.admin_group().to_string();
        let group = match self.access.read_group(&admin_group_name).await? {
            Some(group) => group,
            None => {
                self.access
                    .create_group(&Group::new(admin_group_name, None))
                    .await?
            }
        };
        let user = match self.access.read_user(admin).await? {
            Some(user) => user,
            None => self.access.create_user(&User::new(admin, group.id)).await?,
        };
        if !self
            .access
            .groups_of_user(user.id)
            .await?
            .iter()
            .any(|g| g.id == group.id)
        {
            self.access.add_user_to_group(user.id, group.id).await?;
        }

        let online = self.online_project_id;
        if self.access.read_project(online).await?.is_none() {
            let mut project = Project::new("Online", "The published project", user.id, group.id, group.id);
            project.id = online;
            self.access.create_project(&project).await?;
        }
        let root = ResourcePath::root();
        if self.access.read_resource(online, &root).await?.is_none() {
            let mut folder = Resource::new_folder(root, user.id, group.id, online);
            folder.state = ResourceState::Unchanged;
            self.access.create_resource(online, &folder).await?;
        }

        self.caches.clear_all();
        info!(admin = %user.name, "Repository bootstrapped");
        Ok(RequestContext::new(&user, online, vec![group.id], true).into_internal())
    }

    /// The published project's id.
    pub fn online_project_id(&self) -> ProjectId {
        self.online_project_id
    }

    /// File and folder operations.
    pub fn resources(&self) -> &Arc<ResourceBroker> {
        &self.resources
    }

    /// Project operations and history.
    pub fn projects(&self) -> &Arc<ProjectBroker> {
        &self.projects
    }

    /// Users and groups.
    pub fn principals(&self) -> &Arc<UserGroupBroker> {
        &self.principals
    }

    /// Property definitions.
    pub fn properties(&self) -> &Arc<PropertyBroker> {
        &self.properties
    }

    /// The shared caches.
    pub fn caches(&self) -> &Arc<CacheManager> {
        &self.caches
    }
}
