//! # contenthub-cache
//!
//! In-process caches sitting in front of the access module:
//!
//! - [`ObjectCache`]: a bounded LRU keyed by string or numeric id, with an
//!   optional secondary id index
//! - [`ResourceCache`]: a two-level LRU keyed by path, then by project
//! - [`MembershipMemo`]: the memoized "user in group" answers
//! - [`KeyLocks`]: striped locks ordering cache fills against invalidation
//!
//! Every cache hands out deep clones, never references into shared state.
//! [`CacheManager`] builds the full set from configuration.

pub mod keys;
pub mod locks;
pub mod lru;
pub mod manager;
pub mod memo;
pub mod object;
pub mod object_cache;
pub mod resource_cache;
pub mod value;

pub use locks::KeyLocks;
pub use manager::CacheManager;
pub use memo::MembershipMemo;
pub use object::CachedObject;
pub use object_cache::{CacheStats, ObjectCache};
pub use resource_cache::ResourceCache;
pub use value::{CacheValue, ValueKind};
