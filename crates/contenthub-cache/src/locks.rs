//! Striped locks ordering cache fills against invalidations.
//!
//! A read-through fill (cache miss, access-module read, cache put) runs
//! under the shared guard of its key's stripe. A write (access-module
//! write, cache invalidation) runs under the exclusive guard. A fill that
//! started before a write therefore completes before the write begins, and
//! a fill that starts afterwards reads the new value: no stale snapshot
//! survives a write.

use std::collections::BTreeSet;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Fixed set of reader/writer locks addressed by key hash.
#[derive(Debug)]
pub struct KeyLocks {
    stripes: Vec<RwLock<()>>,
}

impl KeyLocks {
    /// Create `stripes` locks (at least one).
    pub fn new(stripes: usize) -> Self {
        Self {
            stripes: (0..stripes.max(1)).map(|_| RwLock::new(())).collect(),
        }
    }

    /// Number of stripes.
    pub fn stripes(&self) -> usize {
        self.stripes.len()
    }

    fn index<K: Hash + ?Sized>(&self, key: &K) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.stripes.len() as u64) as usize
    }

    /// Shared guard for filling the cache entry of `key`.
    pub async fn read<K: Hash + ?Sized>(&self, key: &K) -> RwLockReadGuard<'_, ()> {
        self.stripes[self.index(key)].read().await
    }

    /// Exclusive guard for mutating `key`.
    pub async fn write<K: Hash + ?Sized>(&self, key: &K) -> RwLockWriteGuard<'_, ()> {
        self.stripes[self.index(key)].write().await
    }

    /// Exclusive guards for several keys, acquired in stripe order.
    pub async fn write_many<'a, K, I>(&self, keys: I) -> Vec<RwLockWriteGuard<'_, ()>>
    where
        K: Hash + ?Sized + 'a,
        I: IntoIterator<Item = &'a K>,
    {
        let indices: BTreeSet<usize> = keys.into_iter().map(|k| self.index(k)).collect();
        let mut guards = Vec::with_capacity(indices.len());
        for idx in indices {
            guards.push(self.stripes[idx].write().await);
        }
        guards
    }

    /// Exclusive guards on every stripe, for bulk invalidation.
    pub async fn write_all(&self) -> Vec<RwLockWriteGuard<'_, ()>> {
        let mut guards = Vec::with_capacity(self.stripes.len());
        for stripe in &self.stripes {
            guards.push(stripe.write().await);
        }
        guards
    }
}
