//! Resource domain entities: files and folders in the path namespace.

pub mod flags;
pub mod model;
pub mod path;
pub mod state;
pub mod types;

pub use flags::AccessFlags;
pub use model::{Resource, ResourceKind};
pub use path::ResourcePath;
pub use state::{ResourceState, Transition};
pub use types::ResourceType;
