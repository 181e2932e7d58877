//! # contenthub-service
//!
//! Cache-aware brokers sitting between the request-handling layer and the
//! access module. Reads are read-through with copy-on-return; writes go to
//! the access module first and invalidate the affected cache entries
//! afterwards. Every call takes a [`RequestContext`] and is authorized by
//! the single [`AccessGuard`].
//!
//! Brokers follow constructor injection: all collaborators are passed in
//! as `Arc` handles. [`ContentHub`] wires a complete set from configuration.

pub mod context;
pub mod guard;
pub mod hub;
pub mod project;
pub mod property;
pub mod resource;
pub mod timeout;
pub mod user;

pub use context::RequestContext;
pub use guard::AccessGuard;
pub use hub::ContentHub;
pub use project::ProjectBroker;
pub use property::PropertyBroker;
pub use resource::ResourceBroker;
pub use timeout::CallTimeout;
pub use user::UserGroupBroker;
