//! # contenthub-entity
//!
//! Domain entity models for ContentHub. Every struct in this crate is a
//! value the access module persists or a snapshot derived from one. All
//! entities derive `Debug`, `Clone`, `PartialEq`, `Serialize`, and
//! `Deserialize`.

pub mod backup;
pub mod project;
pub mod property;
pub mod resource;
pub mod user;

pub use backup::{BackupProject, BackupResource};
pub use project::{Project, ProjectFlags};
pub use property::PropertyDefinition;
pub use resource::{
    AccessFlags, Resource, ResourceKind, ResourcePath, ResourceState, ResourceType, Transition,
};
pub use user::{Group, User};
