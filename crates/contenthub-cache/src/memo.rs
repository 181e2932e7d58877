//! Memoized "user in group" answers.
//!
//! Membership is derived transitively through parent groups, so a single
//! membership change can flip the answer for many pairs. The memo cannot be
//! invalidated per key and is cleared wholesale instead. The same applies
//! when it fills up: a new pair arriving at capacity starts the memo over.

use dashmap::DashMap;
use tracing::debug;

use contenthub_core::config::cache::CacheCapacity;
use contenthub_core::types::{GroupId, UserId};

/// Concurrent `(user, group) -> bool` table.
#[derive(Debug)]
pub struct MembershipMemo {
    capacity: CacheCapacity,
    answers: DashMap<(UserId, GroupId), bool>,
}

impl MembershipMemo {
    /// Create an empty memo. A disabled memo never remembers anything.
    pub fn new(capacity: CacheCapacity) -> Self {
        Self {
            capacity,
            answers: DashMap::new(),
        }
    }

    /// The remembered answer for `(user, group)`.
    pub fn get(&self, user: UserId, group: GroupId) -> Option<bool> {
        if !self.capacity.is_enabled() {
            return None;
        }
        self.answers.get(&(user, group)).map(|entry| *entry.value())
    }

    /// Remember the answer for `(user, group)`.
    pub fn put(&self, user: UserId, group: GroupId, member: bool) {
        if !self.capacity.is_enabled() {
            return;
        }
        let key = (user, group);
        if !self.answers.contains_key(&key) && self.answers.len() >= self.capacity.limit() {
            debug!(
                answers = self.answers.len(),
                "Membership memo full, starting over"
            );
            self.answers.clear();
        }
        self.answers.insert(key, member);
    }

    /// Forget every answer.
    pub fn clear(&self) {
        self.answers.clear();
    }

    /// Number of remembered answers.
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    /// Whether nothing is remembered.
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}
