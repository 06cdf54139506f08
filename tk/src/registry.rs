//! Project registry: primary and inclusive views
//!
//! The primary map holds live (Active or DeletePending) targets; the
//! inclusive map is a superset that can retain entries after deletion so
//! stale references still resolve. No locking here: the manager serializes
//! all structural mutation.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::ProjectId;
use crate::target::TracingTarget;

#[derive(Default)]
pub struct ProjectRegistry {
    primary: HashMap<ProjectId, Arc<TracingTarget>>,
    inclusive: HashMap<ProjectId, Arc<TracingTarget>>,
}

impl ProjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert into both views
    ///
    /// Returns false (and leaves both maps untouched) if the id is already
    /// present; the caller guarantees uniqueness via the allocator.
    pub fn register(&mut self, target: Arc<TracingTarget>) -> bool {
        let id = target.id();
        if self.primary.contains_key(&id) || self.inclusive.contains_key(&id) {
            warn!(%id, "ProjectRegistry::register: id already present");
            return false;
        }
        debug!(%id, "ProjectRegistry::register: registered");
        self.inclusive.insert(id, Arc::clone(&target));
        self.primary.insert(id, target);
        true
    }

    /// Lookup in the primary view
    pub fn lookup(&self, id: ProjectId) -> Option<Arc<TracingTarget>> {
        self.primary.get(&id).cloned()
    }

    /// Lookup in the inclusive view (retains deleted entries)
    pub fn lookup_inclusive(&self, id: ProjectId) -> Option<Arc<TracingTarget>> {
        self.inclusive.get(&id).cloned()
    }

    /// Remove from the primary view; prune the inclusive view only when
    /// asked (configuration choice, default retain)
    pub fn remove(&mut self, id: ProjectId, prune_inclusive: bool) -> Option<Arc<TracingTarget>> {
        let target = self.primary.remove(&id);
        if target.is_some() {
            debug!(%id, prune_inclusive, "ProjectRegistry::remove: removed");
        }
        if prune_inclusive {
            self.inclusive.remove(&id);
        }
        target
    }

    /// All registered targets, unspecified order
    pub fn list(&self) -> Vec<Arc<TracingTarget>> {
        self.primary.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.primary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_empty()
    }
}
