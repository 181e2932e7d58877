//! Integration tests for the broker caches, driven through their public API.

use bytes::Bytes;

use contenthub_cache::{CacheManager, ObjectCache, ResourceCache};
use contenthub_core::config::cache::{CacheCapacity, CacheConfig, DEFAULT_CAPACITY};
use contenthub_core::types::{GroupId, ProjectId, UserId};
use contenthub_entity::{Resource, ResourcePath, ResourceType};

fn path(raw: &str) -> ResourcePath {
    ResourcePath::parse(raw).expect("Invalid path")
}

fn file(raw: &str, project: i64, body: &'static [u8]) -> Resource {
    Resource::new_file(
        path(raw),
        ResourceType::Plain,
        Bytes::from_static(body),
        UserId(1),
        GroupId(1),
        ProjectId(project),
    )
}

#[test]
fn test_least_recently_used_entry_is_evicted() {
    let cache: ObjectCache<String, Resource> =
        ObjectCache::new("resources", CacheCapacity::Bounded(2));
    cache.put("a".into(), &file("/a", 2, b"a"));
    cache.put("b".into(), &file("/b", 2, b"b"));
    assert!(cache.get("a").is_some());

    cache.put("c".into(), &file("/c", 2, b"c"));

    assert!(cache.get("a").is_some());
    assert!(cache.get("b").is_none());
    assert!(cache.get("c").is_some());
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.stats().evictions, 1);
}

#[test]
fn test_cached_content_is_not_shared() {
    let cache: ObjectCache<String, Resource> =
        ObjectCache::new("resources", CacheCapacity::Bounded(4));
    let mut original = file("/a", 2, b"first");
    cache.put("a".into(), &original);

    // Changing the value after the put does not reach the cache.
    original.set_content(Bytes::from_static(b"second"));
    let mut copy = cache.get("a").unwrap();
    assert_eq!(copy.content().unwrap().as_ref(), b"first");

    copy.set_content(Bytes::from_static(b"third"));
    copy.length = 0;
    let again = cache.get("a").unwrap();
    assert_eq!(again.content().unwrap().as_ref(), b"first");
    assert_eq!(again.length, 5);
}

#[test]
fn test_removed_entry_misses() {
    let cache: ObjectCache<String, Resource> =
        ObjectCache::new("resources", CacheCapacity::Bounded(4));
    cache.put("a".into(), &file("/a", 2, b"a"));
    cache.remove("a");
    cache.remove("never-stored");

    assert!(cache.get("a").is_none());
    assert!(cache.is_empty());
}

#[test]
fn test_resource_cache_keeps_projects_apart() {
    let cache = ResourceCache::new(CacheCapacity::Bounded(8), CacheCapacity::Bounded(2));
    let shared = path("/shared.txt");
    cache.put(&shared, ProjectId(2), &file("/shared.txt", 2, b"two"));
    cache.put(&shared, ProjectId(3), &file("/shared.txt", 3, b"three"));

    cache.invalidate(&shared, ProjectId(2));
    assert!(cache.get(&shared, ProjectId(2)).is_none());
    assert_eq!(
        cache.get(&shared, ProjectId(3)).unwrap().project_id,
        ProjectId(3)
    );

    cache.remove(&shared);
    assert!(cache.get(&shared, ProjectId(3)).is_none());
}

#[test]
fn test_resource_cache_bounds_projects_per_path() {
    let cache = ResourceCache::new(CacheCapacity::Bounded(8), CacheCapacity::Bounded(2));
    let shared = path("/shared.txt");
    cache.put(&shared, ProjectId(2), &file("/shared.txt", 2, b"x"));
    cache.put(&shared, ProjectId(3), &file("/shared.txt", 3, b"x"));
    assert!(cache.get(&shared, ProjectId(2)).is_some());
    cache.put(&shared, ProjectId(4), &file("/shared.txt", 4, b"x"));

    assert!(cache.get(&shared, ProjectId(2)).is_some());
    assert!(cache.get(&shared, ProjectId(3)).is_none());
    assert!(cache.get(&shared, ProjectId(4)).is_some());
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_negative_sizes_fall_back_to_default() {
    let config = CacheConfig {
        users: -1,
        ..CacheConfig::default()
    };
    let caches = CacheManager::new(&config);
    assert!(caches.users().is_enabled());

    assert_eq!(
        CacheCapacity::from_configured("users", -1),
        CacheCapacity::Bounded(DEFAULT_CAPACITY)
    );
    assert_eq!(
        CacheCapacity::from_configured("users", 0),
        CacheCapacity::Disabled
    );
}

#[test]
fn test_disabled_resource_cache_stores_nothing() {
    let caches = CacheManager::new(&CacheConfig::disabled());
    let a = path("/a");
    caches.resources().put(&a, ProjectId(2), &file("/a", 2, b"a"));

    assert!(caches.resources().get(&a, ProjectId(2)).is_none());
    assert!(caches.resources().is_empty());
}

#[test]
fn test_clear_all_empties_every_cache() {
    let caches = CacheManager::new(&CacheConfig::default());
    let a = path("/a");
    caches.resources().put(&a, ProjectId(2), &file("/a", 2, b"a"));
    caches.user_in_group().put(UserId(1), GroupId(1), true);

    caches.clear_all();

    assert!(caches.resources().is_empty());
    assert!(caches.user_in_group().is_empty());
    assert!(caches.stats().iter().all(|(_, s)| s.entries == 0));
}
