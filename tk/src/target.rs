//! Per-project tracing target and its deletion state machine
//!
//! Each target owns its own deletion state. Transitions are single locked
//! test-and-set operations, so a cancel racing a grace-timer finalize has
//! exactly one winner; the loser gets a clean state conflict and mutates
//! nothing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::{oneshot, watch};
use tracing::debug;

use crate::domain::ProjectId;
use crate::error::{LifecycleError, LifecycleResult};
use crate::provider::ProjectData;

/// Single-use token authorizing one specific finalize
///
/// Minted by [`TracingTarget::set_delete_pending`]; consumed by whichever of
/// finalize/cancel reaches the target first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletionKey(u64);

/// How a pending deletion was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionOutcome {
    /// The deletion was finalized; the project is gone.
    Finalized,
    /// The deletion was canceled; the project is Active again.
    Canceled,
}

/// Load state of a target's durable data, for diagnostic display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Finished,
    Failed(String),
}

/// Deletion state snapshot exposed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionStateKind {
    Active,
    DeletePending,
    Deleted,
}

enum DeletionState {
    Active,
    DeletePending {
        key: u64,
        waiter: oneshot::Sender<DeletionOutcome>,
    },
    Deleted,
}

/// One project's live tracing session
///
/// Owned by the registry while Active or DeletePending; retained by the
/// inclusive view after deletion for in-flight lookups.
pub struct TracingTarget {
    id: ProjectId,
    data: Arc<dyn ProjectData>,
    state: Mutex<DeletionState>,
    load: Mutex<LoadState>,
    next_key: AtomicU64,
    revision: watch::Sender<u64>,
}

impl TracingTarget {
    pub fn new(id: ProjectId, data: Arc<dyn ProjectData>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            id,
            data,
            state: Mutex::new(DeletionState::Active),
            load: Mutex::new(LoadState::Loading),
            next_key: AtomicU64::new(0),
            revision,
        }
    }

    pub fn id(&self) -> ProjectId {
        self.id
    }

    /// Durable data handle
    pub fn data(&self) -> &Arc<dyn ProjectData> {
        &self.data
    }

    /// Current display name
    pub fn name(&self) -> String {
        self.data.name()
    }

    /// Rename the project (listeners observe a pulse)
    pub fn set_name(&self, name: &str) {
        debug!(id = %self.id, name, "TracingTarget::set_name: called");
        self.data.set_name(name);
        self.bump();
    }

    /// Snapshot of the deletion state
    pub fn deletion_state(&self) -> DeletionStateKind {
        match *self.state.lock().expect("state lock poisoned") {
            DeletionState::Active => DeletionStateKind::Active,
            DeletionState::DeletePending { .. } => DeletionStateKind::DeletePending,
            DeletionState::Deleted => DeletionStateKind::Deleted,
        }
    }

    /// Snapshot of the load state
    pub fn load_state(&self) -> LoadState {
        self.load.lock().expect("load lock poisoned").clone()
    }

    /// Mark durable data as loaded and ready
    pub fn notify_loading_finished(&self) {
        debug!(id = %self.id, "TracingTarget::notify_loading_finished: called");
        *self.load.lock().expect("load lock poisoned") = LoadState::Finished;
        self.bump();
    }

    /// Mark durable data as failed to load, with a reason for display
    pub fn notify_loading_failed(&self, reason: impl Into<String>) {
        let reason = reason.into();
        debug!(id = %self.id, %reason, "TracingTarget::notify_loading_failed: called");
        *self.load.lock().expect("load lock poisoned") = LoadState::Failed(reason);
        self.bump();
    }

    /// Revision stream bumped on every state change and rename
    ///
    /// The manager relays each bump as a payload-free lifecycle pulse.
    pub fn subscribe_changes(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Transition Active -> DeletePending, minting a single-use key
    ///
    /// The returned receiver resolves once the deletion is finalized or
    /// canceled. At most one key is outstanding per target.
    pub fn set_delete_pending(&self) -> LifecycleResult<(DeletionKey, oneshot::Receiver<DeletionOutcome>)> {
        debug!(id = %self.id, "TracingTarget::set_delete_pending: called");
        let mut state = self.state.lock().expect("state lock poisoned");
        match *state {
            DeletionState::Active => {}
            DeletionState::DeletePending { .. } => {
                return Err(self.conflict("deletion already pending"));
            }
            DeletionState::Deleted => {
                return Err(self.conflict("already deleted"));
            }
        }

        let key = self.next_key.fetch_add(1, Ordering::SeqCst);
        let (waiter, outcome_rx) = oneshot::channel();
        *state = DeletionState::DeletePending { key, waiter };
        drop(state);

        self.bump();
        Ok((DeletionKey(key), outcome_rx))
    }

    /// Transition DeletePending -> Active, invalidating the outstanding key
    ///
    /// Fails with a state conflict if the key was already consumed by a
    /// finalize (race lost) or no deletion is pending.
    pub fn cancel_pending_deletion(&self) -> LifecycleResult<()> {
        debug!(id = %self.id, "TracingTarget::cancel_pending_deletion: called");
        let mut state = self.state.lock().expect("state lock poisoned");
        match *state {
            DeletionState::DeletePending { .. } => {}
            DeletionState::Active => return Err(self.conflict("no deletion pending")),
            DeletionState::Deleted => return Err(self.conflict("already deleted")),
        }

        let prev = std::mem::replace(&mut *state, DeletionState::Active);
        drop(state);

        if let DeletionState::DeletePending { waiter, .. } = prev {
            // Receiver may be gone; the cancel still stands.
            let _ = waiter.send(DeletionOutcome::Canceled);
        }
        self.bump();
        Ok(())
    }

    /// Transition DeletePending -> Deleted if `key` is the outstanding key
    ///
    /// Stale or already-consumed keys fail with a state conflict and cause
    /// no mutation. Exactly one of finalize/cancel ever succeeds per key.
    pub fn finalize_deletion(&self, key: DeletionKey) -> LifecycleResult<()> {
        debug!(id = %self.id, "TracingTarget::finalize_deletion: called");
        let mut state = self.state.lock().expect("state lock poisoned");
        match *state {
            DeletionState::DeletePending { key: outstanding, .. } if outstanding == key.0 => {}
            DeletionState::DeletePending { .. } => return Err(self.conflict("stale deletion key")),
            DeletionState::Active => return Err(self.conflict("canceled or already finalized")),
            DeletionState::Deleted => return Err(self.conflict("canceled or already finalized")),
        }

        let prev = std::mem::replace(&mut *state, DeletionState::Deleted);
        drop(state);

        if let DeletionState::DeletePending { waiter, .. } = prev {
            let _ = waiter.send(DeletionOutcome::Finalized);
        }
        self.bump();
        Ok(())
    }

    /// Immediate-delete path: transition straight to Deleted
    ///
    /// Valid from Active or DeletePending; any outstanding waiter resolves
    /// with `Finalized` so an in-flight scheduled deletion settles.
    pub fn force_delete(&self) -> LifecycleResult<()> {
        debug!(id = %self.id, "TracingTarget::force_delete: called");
        let mut state = self.state.lock().expect("state lock poisoned");
        if matches!(*state, DeletionState::Deleted) {
            return Err(self.conflict("already deleted"));
        }

        let prev = std::mem::replace(&mut *state, DeletionState::Deleted);
        drop(state);

        if let DeletionState::DeletePending { waiter, .. } = prev {
            let _ = waiter.send(DeletionOutcome::Finalized);
        }
        self.bump();
        Ok(())
    }

    fn conflict(&self, reason: &'static str) -> LifecycleError {
        LifecycleError::StateConflict { id: self.id, reason }
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }
}
