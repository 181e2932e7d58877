//! Cache-aware access to users, groups, and memberships.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use contenthub_access::AccessModule;
use contenthub_cache::CacheManager;
use contenthub_core::error::AppError;
use contenthub_core::result::AppResult;
use contenthub_core::types::{GroupId, ProjectId, UserId};
use contenthub_entity::{Group, Project, User};

use crate::context::RequestContext;
use crate::guard::AccessGuard;
use crate::timeout::CallTimeout;

/// Read-through caches for principals with invalidate-after-write mutators.
///
/// Users and groups are cached by name and indexed by id. The transitive
/// group closure of a user is cached per user name, and "is user in group"
/// answers are memoized per pair. Because closures derive from the whole
/// membership graph, any change to a membership or to a group's parent
/// clears both derived tables.
#[derive(Debug)]
pub struct UserGroupBroker {
    access: Arc<dyn AccessModule>,
    caches: Arc<CacheManager>,
    guard: AccessGuard,
    timeout: CallTimeout,
    admin_group: String,
    /// Fills share this gate; mutations hold it exclusively.
    gate: RwLock<()>,
}

impl UserGroupBroker {
    /// Creates a new user/group broker.
    pub fn new(
        access: Arc<dyn AccessModule>,
        caches: Arc<CacheManager>,
        guard: AccessGuard,
        timeout: CallTimeout,
        admin_group: impl Into<String>,
    ) -> Self {
        Self {
            access,
            caches,
            guard,
            timeout,
            admin_group: admin_group.into(),
            gate: RwLock::new(()),
        }
    }

    /// Name of the administrators group.
    pub fn admin_group(&self) -> &str {
        &self.admin_group
    }

    // ── Reads ──────────────────────────────────────────────────

    /// Reads a user by name.
    pub async fn read_user(&self, name: &str) -> AppResult<User> {
        let _fill = self.gate.read().await;
        self.load_user(name).await
    }

    /// Reads a user by id.
    pub async fn read_user_by_id(&self, id: UserId) -> AppResult<User> {
        let _fill = self.gate.read().await;
        self.load_user_by_id(id).await
    }

    /// Reads a group by name.
    pub async fn read_group(&self, name: &str) -> AppResult<Group> {
        let _fill = self.gate.read().await;
        self.load_group(name).await
    }

    /// Reads a group by id.
    pub async fn read_group_by_id(&self, id: GroupId) -> AppResult<Group> {
        let _fill = self.gate.read().await;
        self.load_group_by_id(id).await
    }

    /// Every group `name` belongs to: direct memberships first, then their
    /// ancestors, without duplicates.
    pub async fn groups_of_user(&self, name: &str) -> AppResult<Vec<Group>> {
        let _fill = self.gate.read().await;
        self.load_groups_of_user(name).await
    }

    /// Whether `user` belongs to `group`, directly or through a child group.
    pub async fn user_in_group(&self, user: UserId, group: GroupId) -> AppResult<bool> {
        let _fill = self.gate.read().await;
        self.check_membership(user, group).await
    }

    /// Direct members of the group named `name`. Not cached.
    pub async fn users_of_group(&self, name: &str) -> AppResult<Vec<User>> {
        let group = self.read_group(name).await?;
        self.timeout
            .run("users_of_group", self.access.users_of_group(group.id))
            .await
    }

    /// Whether `user` is an administrator.
    pub async fn is_admin(&self, user: UserId) -> AppResult<bool> {
        let _fill = self.gate.read().await;
        let admins = match self.load_group(&self.admin_group).await {
            Ok(group) => group,
            Err(e) if e.is_not_found() => return Ok(false),
            Err(e) => return Err(e),
        };
        self.check_membership(user, admins.id).await
    }

    /// Whether `user` may publish `project`.
    pub async fn is_manager_of_project(&self, user: UserId, project: &Project) -> AppResult<bool> {
        if self.is_admin(user).await? {
            return Ok(true);
        }
        self.user_in_group(user, project.manager_group_id).await
    }

    /// Build the request context of `name` working in `project`.
    pub async fn context_for(&self, name: &str, project: ProjectId) -> AppResult<RequestContext> {
        let _fill = self.gate.read().await;
        let user = self.load_user(name).await?;
        if user.disabled {
            return Err(AppError::authorization(format!("User '{name}' is disabled")));
        }
        let groups = self.load_groups_of_user(name).await?;
        let is_admin = groups.iter().any(|g| g.name == self.admin_group);
        let group_ids = groups.iter().map(|g| g.id).collect();
        Ok(RequestContext::new(&user, project, group_ids, is_admin))
    }

    /// Name of user `id`, or `#id` for a user that no longer exists.
    pub(crate) async fn user_name(&self, id: UserId) -> AppResult<String> {
        match self.read_user_by_id(id).await {
            Ok(user) => Ok(user.name),
            Err(e) if e.is_not_found() => Ok(format!("#{id}")),
            Err(e) => Err(e),
        }
    }

    /// Name of group `id`, or `#id` for a group that no longer exists.
    pub(crate) async fn group_name(&self, id: GroupId) -> AppResult<String> {
        match self.read_group_by_id(id).await {
            Ok(group) => Ok(group.name),
            Err(e) if e.is_not_found() => Ok(format!("#{id}")),
            Err(e) => Err(e),
        }
    }

    // ── Fills (callers hold the gate) ──────────────────────────

    async fn load_user(&self, name: &str) -> AppResult<User> {
        let cache = self.caches.users();
        if let Some(user) = cache.get(name) {
            debug!(user = name, "User cache hit");
            return Ok(user);
        }
        let user = self
            .timeout
            .run("read_user", self.access.read_user(name))
            .await?
            .ok_or_else(|| AppError::not_found(format!("User '{name}' not found")))?;
        cache.put_with_id(user.name.clone(), user.id.get(), &user);
        Ok(user)
    }

    async fn load_user_by_id(&self, id: UserId) -> AppResult<User> {
        let cache = self.caches.users();
        if let Some(user) = cache.get_by_id(id.get()) {
            return Ok(user);
        }
        let user = self
            .timeout
            .run("read_user_by_id", self.access.read_user_by_id(id))
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;
        cache.put_with_id(user.name.clone(), user.id.get(), &user);
        Ok(user)
    }

    async fn load_group(&self, name: &str) -> AppResult<Group> {
        let cache = self.caches.groups();
        if let Some(group) = cache.get(name) {
            return Ok(group);
        }
        let group = self
            .timeout
            .run("read_group", self.access.read_group(name))
            .await?
            .ok_or_else(|| AppError::not_found(format!("Group '{name}' not found")))?;
        cache.put_with_id(group.name.clone(), group.id.get(), &group);
        Ok(group)
    }

    async fn load_group_by_id(&self, id: GroupId) -> AppResult<Group> {
        let cache = self.caches.groups();
        if let Some(group) = cache.get_by_id(id.get()) {
            return Ok(group);
        }
        let group = self
            .timeout
            .run("read_group_by_id", self.access.read_group_by_id(id))
            .await?
            .ok_or_else(|| AppError::not_found(format!("Group {id} not found")))?;
        cache.put_with_id(group.name.clone(), group.id.get(), &group);
        Ok(group)
    }

    async fn load_groups_of_user(&self, name: &str) -> AppResult<Vec<Group>> {
        let cache = self.caches.groups_of_user();
        if let Some(groups) = cache.get(name) {
            return Ok(groups);
        }
        let user = self.load_user(name).await?;
        let direct = self
            .timeout
            .run("groups_of_user", self.access.groups_of_user(user.id))
            .await?;

        let mut seen: HashSet<GroupId> = direct.iter().map(|g| g.id).collect();
        let mut closure = direct.clone();
        for group in &direct {
            let mut parent = group.parent_id;
            while let Some(id) = parent {
                if !seen.insert(id) {
                    break;
                }
                let ancestor = self.load_group_by_id(id).await?;
                parent = ancestor.parent_id;
                closure.push(ancestor);
            }
        }
        cache.put(name.to_string(), &closure);
        Ok(closure)
    }

    async fn check_membership(&self, user: UserId, group: GroupId) -> AppResult<bool> {
        let memo = self.caches.user_in_group();
        if let Some(answer) = memo.get(user, group) {
            return Ok(answer);
        }
        let name = self.load_user_by_id(user).await?.name;
        let member = self
            .load_groups_of_user(&name)
            .await?
            .iter()
            .any(|g| g.id == group);
        memo.put(user, group, member);
        Ok(member)
    }

    fn forget_memberships(&self) {
        self.caches.groups_of_user().clear();
        self.caches.user_in_group().clear();
    }

    // ── Mutations ──────────────────────────────────────────────

    /// Creates a user.
    pub async fn add_user(&self, ctx: &RequestContext, user: &User) -> AppResult<User> {
        self.guard.require_admin(ctx)?;
        let _write = self.gate.write().await;
        let created = self
            .timeout
            .run("create_user", self.access.create_user(user))
            .await?;
        self.caches.users().remove(created.name.as_str());
        info!(user = %created.name, user_id = %created.id, "User created");
        Ok(created)
    }

    /// Writes a user.
    pub async fn write_user(&self, ctx: &RequestContext, user: &User) -> AppResult<User> {
        if ctx.user_id != user.id {
            self.guard.require_admin(ctx)?;
        }
        let _write = self.gate.write().await;
        let previous = self
            .timeout
            .run("read_user_by_id", self.access.read_user_by_id(user.id))
            .await?;
        let written = self
            .timeout
            .run("write_user", self.access.write_user(user))
            .await?;

        let users = self.caches.users();
        users.remove_by_id(user.id.get());
        users.remove(user.name.as_str());
        if let Some(previous) = previous {
            users.remove(previous.name.as_str());
            self.caches.groups_of_user().remove(previous.name.as_str());
        }
        self.caches.groups_of_user().remove(user.name.as_str());
        info!(user = %written.name, "User updated");
        Ok(written)
    }

    /// Deletes a user together with their memberships.
    pub async fn delete_user(&self, ctx: &RequestContext, id: UserId) -> AppResult<()> {
        self.guard.require_admin(ctx)?;
        if ctx.user_id == id {
            return Err(AppError::validation("Users cannot delete themselves"));
        }
        let _write = self.gate.write().await;
        self.timeout
            .run("delete_user", self.access.delete_user(id))
            .await?;
        self.caches.users().remove_by_id(id.get());
        self.forget_memberships();
        info!(user_id = %id, "User deleted");
        Ok(())
    }

    /// Creates a group.
    pub async fn add_group(&self, ctx: &RequestContext, group: &Group) -> AppResult<Group> {
        self.guard.require_admin(ctx)?;
        let _write = self.gate.write().await;
        let created = self
            .timeout
            .run("create_group", self.access.create_group(group))
            .await?;
        self.caches.groups().remove(created.name.as_str());
        info!(group = %created.name, group_id = %created.id, "Group created");
        Ok(created)
    }

    /// Writes a group. A changed parent reshapes every closure.
    pub async fn write_group(&self, ctx: &RequestContext, group: &Group) -> AppResult<Group> {
        self.guard.require_admin(ctx)?;
        let _write = self.gate.write().await;
        let written = self
            .timeout
            .run("write_group", self.access.write_group(group))
            .await?;
        let groups = self.caches.groups();
        groups.remove_by_id(group.id.get());
        groups.remove(group.name.as_str());
        self.forget_memberships();
        info!(group = %written.name, "Group updated");
        Ok(written)
    }

    /// Deletes a group together with its memberships.
    pub async fn delete_group(&self, ctx: &RequestContext, id: GroupId) -> AppResult<()> {
        self.guard.require_admin(ctx)?;
        let _write = self.gate.write().await;
        self.timeout
            .run("delete_group", self.access.delete_group(id))
            .await?;
        self.caches.groups().remove_by_id(id.get());
        self.forget_memberships();
        info!(group_id = %id, "Group deleted");
        Ok(())
    }

    /// Adds `user` to `group`.
    pub async fn add_user_to_group(
        &self,
        ctx: &RequestContext,
        user: UserId,
        group: GroupId,
    ) -> AppResult<()> {
        self.guard.require_admin(ctx)?;
        let _write = self.gate.write().await;
        self.timeout
            .run("add_user_to_group", self.access.add_user_to_group(user, group))
            .await?;
        self.forget_memberships();
        info!(user_id = %user, group_id = %group, "User added to group");
        Ok(())
    }

    /// Removes `user` from `group`.
    pub async fn remove_user_from_group(
        &self,
        ctx: &RequestContext,
        user: UserId,
        group: GroupId,
    ) -> AppResult<()> {
        self.guard.require_admin(ctx)?;
        let _write = self.gate.write().await;
        self.timeout
            .run(
                "remove_user_from_group",
                self.access.remove_user_from_group(user, group),
            )
            .await?;
        self.forget_memberships();
        info!(user_id = %user, group_id = %group, "User removed from group");
        Ok(())
    }
}
