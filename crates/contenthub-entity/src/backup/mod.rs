//! Immutable publish-time snapshots used for history browsing.

pub mod project;
pub mod resource;

pub use project::{BackupProject, ProjectNames};
pub use resource::{BackupResource, ResourceNames};
