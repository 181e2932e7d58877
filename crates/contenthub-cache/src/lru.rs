//! Bounded least-recently-used table over [`lru::LruCache`].
//!
//! Eviction always takes the globally least recently touched entry in O(1).
//! A zero capacity holds no table at all, so every insert is dropped.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;

use lru::LruCache;

use crate::object::CachedObject;

/// An LRU table without interior locking.
pub struct LruTable<K, V> {
    entries: Option<LruCache<K, CachedObject<V>>>,
    clock: u64,
}

impl<K, V> fmt::Debug for LruTable<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruTable")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}

impl<K, V> LruTable<K, V>
where
    K: Eq + Hash + Clone,
{
    /// An empty table holding at most `capacity` entries.
    ///
    /// A table with capacity `0` accepts no entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: NonZeroUsize::new(capacity).map(LruCache::new),
            clock: 0,
        }
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.entries.as_ref().map_or(0, |entries| entries.cap().get())
    }

    /// Current number of entries.
    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, LruCache::len)
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `key` is present. Does not count as a use.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries
            .as_ref()
            .is_some_and(|entries| entries.contains(key))
    }

    /// Look up `key`, marking it as most recently used.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut CachedObject<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let tick = self.tick();
        let entry = self.entries.as_mut()?.get_mut(key)?;
        entry.touch(tick);
        Some(entry)
    }

    /// Look up `key` without marking it as used.
    pub fn peek<Q>(&self, key: &Q) -> Option<&CachedObject<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.as_ref()?.peek(key)
    }

    /// Insert or replace `key`.
    ///
    /// Inserting a new key into a full table first evicts exactly one entry,
    /// the least recently touched one, and returns it. Replacing an existing
    /// key never evicts.
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        let tick = self.tick();
        let entries = self.entries.as_mut()?;
        if let Some(entry) = entries.get_mut(&key) {
            *entry.value_mut() = value;
            entry.touch(tick);
            return None;
        }
        entries
            .push(key, CachedObject::new(value, tick))
            .map(|(evicted, entry)| (evicted, entry.into_value()))
    }

    /// Remove `key`, returning its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries
            .as_mut()?
            .pop(key)
            .map(CachedObject::into_value)
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        if let Some(entries) = self.entries.as_mut() {
            entries.clear();
        }
    }

    /// Iterate over keys, most recently used first.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries
            .iter()
            .flat_map(|entries| entries.iter())
            .map(|(key, _)| key)
    }

    /// Iterate over entries, most recently used first, without touching.
    pub fn values(&self) -> impl Iterator<Item = &CachedObject<V>> {
        self.entries
            .iter()
            .flat_map(|entries| entries.iter())
            .map(|(_, entry)| entry)
    }
}
