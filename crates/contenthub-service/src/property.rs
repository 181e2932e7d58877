//! Property definitions: which named properties a resource type may carry.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use contenthub_access::AccessModule;
use contenthub_cache::CacheManager;
use contenthub_cache::keys;
use contenthub_core::error::AppError;
use contenthub_core::result::AppResult;
use contenthub_entity::{PropertyDefinition, ResourceType};

use crate::context::RequestContext;
use crate::guard::AccessGuard;
use crate::timeout::CallTimeout;

/// Read-through cache of property definitions keyed by `(type, name)`.
#[derive(Debug)]
pub struct PropertyBroker {
    access: Arc<dyn AccessModule>,
    caches: Arc<CacheManager>,
    guard: AccessGuard,
    timeout: CallTimeout,
    gate: RwLock<()>,
}

impl PropertyBroker {
    /// Creates a new property broker.
    pub fn new(
        access: Arc<dyn AccessModule>,
        caches: Arc<CacheManager>,
        guard: AccessGuard,
        timeout: CallTimeout,
    ) -> Self {
        Self {
            access,
            caches,
            guard,
            timeout,
            gate: RwLock::new(()),
        }
    }

    /// Reads the definition of `name` for `resource_type`.
    pub async fn read_property_definition(
        &self,
        resource_type: ResourceType,
        name: &str,
    ) -> AppResult<PropertyDefinition> {
        let _fill = self.gate.read().await;
        let key = keys::property_definition(resource_type, name);
        let cache = self.caches.property_definitions();
        if let Some(definition) = cache.get(key.as_str()) {
            return Ok(definition);
        }
        let definition = self
            .timeout
            .run(
                "read_property_definition",
                self.access.read_property_definition(resource_type, name),
            )
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "Property '{name}' is not defined for {resource_type}"
                ))
            })?;
        cache.put_with_id(key, definition.id.get(), &definition);
        Ok(definition)
    }

    /// Defines `name` for `resource_type`.
    pub async fn create_property_definition(
        &self,
        ctx: &RequestContext,
        resource_type: ResourceType,
        name: &str,
    ) -> AppResult<PropertyDefinition> {
        self.guard.require_admin(ctx)?;
        if name.trim().is_empty() {
            return Err(AppError::validation("Property name must not be empty"));
        }
        let _write = self.gate.write().await;
        let created = self
            .timeout
            .run(
                "create_property_definition",
                self.access
                    .create_property_definition(&PropertyDefinition::new(name, resource_type)),
            )
            .await?;
        self.caches
            .property_definitions()
            .remove(keys::property_definition(resource_type, name).as_str());
        info!(property = name, resource_type = %resource_type, "Property defined");
        Ok(created)
    }

    /// Removes the definition of `name` for `resource_type`.
    pub async fn delete_property_definition(
        &self,
        ctx: &RequestContext,
        resource_type: ResourceType,
        name: &str,
    ) -> AppResult<()> {
        self.guard.require_admin(ctx)?;
        let _write = self.gate.write().await;
        let definition = self
            .timeout
            .run(
                "read_property_definition",
                self.access.read_property_definition(resource_type, name),
            )
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "Property '{name}' is not defined for {resource_type}"
                ))
            })?;
        self.timeout
            .run(
                "delete_property_definition",
                self.access.delete_property_definition(definition.id),
            )
            .await?;
        self.caches
            .property_definitions()
            .remove_by_id(definition.id.get());
        info!(property = name, resource_type = %resource_type, "Property definition removed");
        Ok(())
    }
}
