//! Property definition entity.

use serde::{Deserialize, Serialize};

use contenthub_core::types::PropertyDefinitionId;

use crate::resource::ResourceType;

/// Declares that resources of a given type may carry a named property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    /// Unique identifier.
    pub id: PropertyDefinitionId,
    /// Property name, unique per resource type.
    pub name: String,
    /// The resource type the definition applies to.
    pub resource_type: ResourceType,
}

impl PropertyDefinition {
    /// A new definition. The id is assigned by the access module.
    pub fn new(name: impl Into<String>, resource_type: ResourceType) -> Self {
        Self {
            id: PropertyDefinitionId(0),
            name: name.into(),
            resource_type,
        }
    }
}
