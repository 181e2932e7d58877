//! Two-level resource cache: path first, then project.
//!
//! The same path has an independent snapshot in every open project. The
//! outer table is keyed by path so a structural change can drop every
//! project's view at once; each outer entry holds a small LRU keyed by
//! project id so invalidating one project leaves the others untouched.

use std::fmt;
use std::sync::Mutex;

use tracing::trace;

use contenthub_core::config::cache::CacheCapacity;
use contenthub_core::types::ProjectId;
use contenthub_entity::{Resource, ResourcePath};

use crate::lru::LruTable;
use crate::object_cache::{CacheStats, Counters};
use crate::value::CacheValue;

type ProjectTable = LruTable<ProjectId, Resource>;

/// Cache of resource headers keyed by `(path, project)`.
pub struct ResourceCache {
    paths: CacheCapacity,
    projects_per_path: CacheCapacity,
    state: Mutex<LruTable<ResourcePath, ProjectTable>>,
    counters: Counters,
}

impl fmt::Debug for ResourceCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceCache")
            .field("paths", &self.paths)
            .field("projects_per_path", &self.projects_per_path)
            .finish()
    }
}

impl ResourceCache {
    /// Create an empty cache. Disabling either level disables the cache.
    pub fn new(paths: CacheCapacity, projects_per_path: CacheCapacity) -> Self {
        Self {
            paths,
            projects_per_path,
            state: Mutex::new(LruTable::new(paths.limit())),
            counters: Counters::default(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruTable<ResourcePath, ProjectTable>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Whether the cache stores anything.
    pub fn is_enabled(&self) -> bool {
        self.paths.is_enabled() && self.projects_per_path.is_enabled()
    }

    /// A copy of the snapshot of `path` in `project`.
    pub fn get(&self, path: &ResourcePath, project: ProjectId) -> Option<Resource> {
        if !self.is_enabled() {
            self.counters.miss();
            return None;
        }
        let mut paths = self.lock();
        let found = paths
            .get_mut(path)
            .and_then(|projects| projects.value_mut().get_mut(&project))
            .map(|entry| entry.clone_value());
        match &found {
            Some(_) => self.counters.hit(),
            None => self.counters.miss(),
        }
        found
    }

    /// Store a copy of `value` as the snapshot of `path` in `project`.
    pub fn put(&self, path: &ResourcePath, project: ProjectId, value: &Resource) {
        if !self.is_enabled() {
            return;
        }
        let copy = value.deep_clone();
        let mut paths = self.lock();
        if let Some(projects) = paths.get_mut(path) {
            if projects.value_mut().insert(project, copy).is_some() {
                self.counters.evicted();
            }
            return;
        }

        let mut projects = ProjectTable::new(self.projects_per_path.limit());
        projects.insert(project, copy);
        if let Some((evicted, _)) = paths.insert(path.clone(), projects) {
            self.counters.evicted();
            trace!(path = %evicted, "Evicted least recently used path");
        }
    }

    /// Drop the snapshot of `path` in `project` only.
    pub fn invalidate(&self, path: &ResourcePath, project: ProjectId) {
        let mut paths = self.lock();
        let now_empty = match paths.get_mut(path) {
            Some(projects) => {
                let projects = projects.value_mut();
                projects.remove(&project);
                projects.is_empty()
            }
            None => false,
        };
        if now_empty {
            paths.remove(path);
        }
    }

    /// Drop every project's snapshot of `path`.
    pub fn remove(&self, path: &ResourcePath) {
        self.lock().remove(path);
    }

    /// Drop everything.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of cached `(path, project)` pairs.
    pub fn len(&self) -> usize {
        self.lock()
            .values()
            .map(|projects| projects.value().len())
            .sum()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current counters.
    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot(self.len())
    }
}
