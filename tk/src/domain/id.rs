//! Project identifiers and the monotonic allocator

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Opaque, totally-ordered project identifier
///
/// Ids are unique across the process lifetime and never reused, even after
/// the project they named is deleted. Serializes as a plain number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(u64);

impl ProjectId {
    /// Wrap a raw id value
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw id value
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Concurrency-safe source of strictly increasing project ids
///
/// The floor is restored from persisted state at startup; `observe` raises
/// it when pre-existing ids are registered so later allocations stay unique.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: AtomicU64,
}

impl IdAllocator {
    /// Allocator whose first id is `floor`
    pub fn starting_at(floor: u64) -> Self {
        Self {
            next: AtomicU64::new(floor),
        }
    }

    /// Allocate the next id; never fails, never blocks
    pub fn next(&self) -> ProjectId {
        ProjectId(self.next.fetch_add(1, Ordering::SeqCst))
    }

    /// Raise the floor to `id + 1` without emitting an id
    ///
    /// Used when registering a persisted id so `next` can never collide
    /// with it. Lower ids leave the floor untouched.
    pub fn observe(&self, id: ProjectId) {
        self.next.fetch_max(id.0 + 1, Ordering::SeqCst);
    }
}
