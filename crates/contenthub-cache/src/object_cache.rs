//! Bounded LRU object cache with an optional numeric id index.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::trace;

use contenthub_core::config::cache::CacheCapacity;

use crate::lru::LruTable;
use crate::value::CacheValue;

/// Hit/miss counters of one cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Entries dropped to make room.
    pub evictions: u64,
    /// Entries currently held.
    pub entries: usize,
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl Counters {
    pub(crate) fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn evicted(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, entries: usize) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            entries,
        }
    }
}

struct State<K, V> {
    table: LruTable<K, V>,
    key_by_id: HashMap<i64, K>,
    id_by_key: HashMap<K, i64>,
}

impl<K: Eq + Hash + Clone, V> State<K, V> {
    fn forget_key<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if let Some(id) = self.id_by_key.remove(key) {
            self.key_by_id.remove(&id);
        }
    }
}

/// A thread-safe LRU cache.
///
/// Values are deep-cloned when stored and again when returned, so nothing
/// a caller holds aliases the cached copy. Every operation runs under one
/// mutex and is atomic with respect to the others.
pub struct ObjectCache<K, V> {
    name: &'static str,
    capacity: CacheCapacity,
    state: Mutex<State<K, V>>,
    counters: Counters,
}

impl<K, V> fmt::Debug for ObjectCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectCache")
            .field("name", &self.name)
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl<K, V> ObjectCache<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: CacheValue,
{
    /// Create an empty cache.
    pub fn new(name: &'static str, capacity: CacheCapacity) -> Self {
        Self {
            name,
            capacity,
            state: Mutex::new(State {
                table: LruTable::new(capacity.limit()),
                key_by_id: HashMap::new(),
                id_by_key: HashMap::new(),
            }),
            counters: Counters::default(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State<K, V>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The cache name used in logs.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the cache stores anything.
    pub fn is_enabled(&self) -> bool {
        self.capacity.is_enabled()
    }

    /// Look up `key`, returning a copy of the cached value.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if !self.is_enabled() {
            self.counters.miss();
            return None;
        }
        let mut state = self.lock();
        match state.table.get_mut(key) {
            Some(entry) => {
                self.counters.hit();
                Some(entry.clone_value())
            }
            None => {
                self.counters.miss();
                None
            }
        }
    }

    /// Look up the entry registered under numeric `id`.
    pub fn get_by_id(&self, id: i64) -> Option<V> {
        if !self.is_enabled() {
            self.counters.miss();
            return None;
        }
        let mut state = self.lock();
        let Some(key) = state.key_by_id.get(&id).cloned() else {
            self.counters.miss();
            return None;
        };
        match state.table.get_mut(&key) {
            Some(entry) => {
                self.counters.hit();
                Some(entry.clone_value())
            }
            None => {
                self.counters.miss();
                None
            }
        }
    }

    /// Store a copy of `value` under `key`.
    pub fn put(&self, key: K, value: &V) {
        self.insert(key, None, value);
    }

    /// Store a copy of `value` under `key`, also reachable through `id`.
    pub fn put_with_id(&self, key: K, id: i64, value: &V) {
        self.insert(key, Some(id), value);
    }

    fn insert(&self, key: K, id: Option<i64>, value: &V) {
        if !self.is_enabled() {
            return;
        }
        let copy = value.deep_clone();
        let mut state = self.lock();

        // A key re-registered under a different id must not stay reachable
        // through the old one.
        state.forget_key(&key);
        if let Some(id) = id {
            if let Some(previous) = state.key_by_id.remove(&id) {
                state.id_by_key.remove(&previous);
                state.table.remove(&previous);
            }
        }

        if let Some((evicted, _)) = state.table.insert(key.clone(), copy) {
            state.forget_key(&evicted);
            self.counters.evicted();
            trace!(cache = self.name, key = ?evicted, "Evicted least recently used entry");
        }
        if let Some(id) = id {
            state.key_by_id.insert(id, key.clone());
            state.id_by_key.insert(key, id);
        }
    }

    /// Remove `key`. Removing an absent key is a no-op.
    pub fn remove<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut state = self.lock();
        state.table.remove(key);
        state.forget_key(key);
    }

    /// Remove the entry registered under numeric `id`.
    pub fn remove_by_id(&self, id: i64) {
        let mut state = self.lock();
        if let Some(key) = state.key_by_id.remove(&id) {
            state.id_by_key.remove(&key);
            state.table.remove(&key);
        }
    }

    /// Drop every entry and every id mapping.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.table.clear();
        state.key_by_id.clear();
        state.id_by_key.clear();
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.lock().table.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current counters.
    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot(self.len())
    }
}
