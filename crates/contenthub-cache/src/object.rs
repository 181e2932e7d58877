//! A cached value paired with its last-touch time.

use crate::value::{CacheValue, ValueKind};

/// Holder for one cache entry.
///
/// `touched` is a logical clock owned by the enclosing table: it increases
/// on every hit and insert, so the smallest value is the least recently
/// used entry.
#[derive(Debug)]
pub struct CachedObject<V> {
    value: V,
    touched: u64,
}

impl<V> CachedObject<V> {
    /// Wrap `value`, touched at `tick`.
    pub fn new(value: V, tick: u64) -> Self {
        Self {
            value,
            touched: tick,
        }
    }

    /// Record a use at `tick`.
    pub fn touch(&mut self, tick: u64) {
        self.touched = tick;
    }

    /// The logical time of the last use.
    pub fn last_touched(&self) -> u64 {
        self.touched
    }

    /// Borrow the stored value.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Mutably borrow the stored value.
    pub fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    /// Unwrap the stored value.
    pub fn into_value(self) -> V {
        self.value
    }
}

impl<V: CacheValue> CachedObject<V> {
    /// An independent copy of the stored value.
    pub fn clone_value(&self) -> V {
        self.value.deep_clone()
    }

    /// Kind of the stored value.
    pub fn kind(&self) -> ValueKind {
        self.value.kind()
    }
}
