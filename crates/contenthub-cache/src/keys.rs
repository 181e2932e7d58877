//! Cache key builders.
//!
//! Centralising key construction keeps the brokers agreeing on the shape
//! of every composite key.

use contenthub_entity::ResourceType;

/// Key of a property definition: names are only unique per resource type.
pub fn property_definition(resource_type: ResourceType, name: &str) -> String {
    format!("{}:{name}", resource_type.type_id())
}
