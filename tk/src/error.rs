//! Lifecycle error taxonomy
//!
//! Unknown ids are never errors; lookups return empty results instead. The
//! variants here cover the cases the core surfaces to callers.

use std::time::Duration;
use thiserror::Error;

use crate::domain::ProjectId;

/// Errors surfaced by lifecycle operations
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// A cancel or finalize lost the race for a deletion key, or the target
    /// was not in the required state for the transition.
    #[error("Deletion state conflict for project {id}: {reason}")]
    StateConflict { id: ProjectId, reason: &'static str },

    /// The state-change relay did not acknowledge within the bound.
    /// Registration cannot proceed without it; treat as a startup fault.
    #[error("State-change subscription for project {id} not acknowledged within {timeout:?}")]
    AckTimeout { id: ProjectId, timeout: Duration },

    /// Durable-storage failure from the data provider, propagated unmasked.
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result alias for lifecycle operations
pub type LifecycleResult<T> = Result<T, LifecycleError>;

impl LifecycleError {
    pub(crate) fn storage(err: eyre::Report) -> Self {
        Self::Storage(format!("{err:#}"))
    }
}
