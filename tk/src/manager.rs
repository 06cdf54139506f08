//! ProjectManager - the lifecycle façade
//!
//! Composes the allocator, registry, deletion protocol, and lifecycle bus.
//! A single mutex over the registry and pending-deletion bookkeeping is the
//! serialization boundary for structural mutation; the allocator is atomic
//! and the per-target state machines own their own transitions.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::{IdAllocator, ProjectId};
use crate::error::{LifecycleError, LifecycleResult};
use crate::events::{LifecycleBus, ListChanged};
use crate::provider::DataProvider;
use crate::registry::ProjectRegistry;
use crate::target::{DeletionKey, DeletionOutcome, TracingTarget};

/// Grace period before a scheduled deletion is finalized
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(15);

/// Bound on the wait for a state-change relay to acknowledge
pub const DEFAULT_ACK_TIMEOUT: Duration = Duration::from_secs(1);

/// Tunables for the lifecycle manager
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Delay between scheduling a deletion and automatic finalization
    pub grace_period: Duration,
    /// Bound on the relay acknowledgment wait during registration
    pub ack_timeout: Duration,
    /// Whether immediate removal also prunes the inclusive view
    pub prune_inclusive_on_remove: bool,
    /// Lifecycle bus capacity
    pub notify_capacity: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            grace_period: DEFAULT_GRACE_PERIOD,
            ack_timeout: DEFAULT_ACK_TIMEOUT,
            prune_inclusive_on_remove: false,
            notify_capacity: crate::events::DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// A deletion scheduled but not yet finalized or canceled
struct PendingDeletion {
    /// Key of the cycle this entry belongs to; cleanup must match it so a
    /// stale watcher never disturbs a newer cycle's bookkeeping
    key: DeletionKey,
    /// Armed grace timer; aborted on cancel or immediate removal
    timer: JoinHandle<()>,
}

/// State guarded by the manager's single mutex
struct ManagerInner {
    registry: ProjectRegistry,
    pending: HashMap<ProjectId, PendingDeletion>,
}

/// The project lifecycle manager
///
/// Cheap to share behind an [`Arc`]; all operations take `&self` and may be
/// called concurrently.
pub struct ProjectManager {
    config: ManagerConfig,
    ids: IdAllocator,
    bus: LifecycleBus,
    provider: Arc<dyn DataProvider>,
    inner: Mutex<ManagerInner>,
}

impl ProjectManager {
    /// Create a manager over the given provider
    ///
    /// Restores the allocator's high-water mark from the provider's highest
    /// persisted id.
    pub async fn new(provider: Arc<dyn DataProvider>, config: ManagerConfig) -> LifecycleResult<Arc<Self>> {
        let floor = provider
            .max_project_id()
            .await
            .map_err(LifecycleError::storage)?
            .map(|id| id.get() + 1)
            .unwrap_or(0);
        debug!(floor, "ProjectManager::new: allocator floor restored");

        Ok(Arc::new(Self {
            bus: LifecycleBus::new(config.notify_capacity),
            ids: IdAllocator::starting_at(floor),
            config,
            provider,
            inner: Mutex::new(ManagerInner {
                registry: ProjectRegistry::new(),
                pending: HashMap::new(),
            }),
        }))
    }

    /// Subscribe to lifecycle pulses
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<ListChanged> {
        self.bus.subscribe()
    }

    /// Lookup a live project
    pub async fn get_project(&self, id: ProjectId) -> Option<Arc<TracingTarget>> {
        self.inner.lock().await.registry.lookup(id)
    }

    /// Lookup in the inclusive view (retains deleted entries)
    pub async fn get_inclusive_project(&self, id: ProjectId) -> Option<Arc<TracingTarget>> {
        self.inner.lock().await.registry.lookup_inclusive(id)
    }

    /// All live projects, unspecified order
    pub async fn projects(&self) -> Vec<Arc<TracingTarget>> {
        self.inner.lock().await.registry.list()
    }

    /// Number of live projects
    pub async fn len(&self) -> usize {
        self.inner.lock().await.registry.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.registry.is_empty()
    }

    /// Create a new project: allocate an id, create durable data, register
    /// a target, and pulse listeners
    pub async fn create_project(self: &Arc<Self>) -> LifecycleResult<ProjectId> {
        let id = self.ids.next();
        debug!(%id, "ProjectManager::create_project: called");

        let data = self.provider.get_project(id).await.map_err(LifecycleError::storage)?;
        let target = Arc::new(TracingTarget::new(id, data));
        target.notify_loading_finished();

        self.start_relay(&target).await?;
        self.register(target).await?;
        info!(%id, "ProjectManager::create_project: project created");
        Ok(id)
    }

    /// Reconstruct targets from the provider's persisted listing at startup
    ///
    /// Observes each persisted id so the allocator never re-issues it, loads
    /// durable data without re-creating it, and registers targets marked
    /// load-finished. Returns the number of projects loaded.
    pub async fn load_persisted_projects(self: &Arc<Self>) -> LifecycleResult<usize> {
        let ids = self.provider.project_list().await.map_err(LifecycleError::storage)?;
        debug!(count = ids.len(), "ProjectManager::load_persisted_projects: called");

        let mut loaded = 0;
        for id in ids {
            self.ids.observe(id);
            let data = self.provider.get_project(id).await.map_err(LifecycleError::storage)?;
            let target = Arc::new(TracingTarget::new(id, data));
            target.notify_loading_finished();

            self.start_relay(&target).await?;
            self.register(target).await?;
            loaded += 1;
        }
        info!(loaded, "ProjectManager::load_persisted_projects: done");
        Ok(loaded)
    }

    /// Immediately delete a project
    ///
    /// Valid from Active or DeletePending. Detaches the registry entry and
    /// any pending-deletion bookkeeping atomically, then removes durable
    /// state and pulses. Returns the removed target, or `None` if unknown.
    pub async fn remove_project(&self, id: ProjectId) -> LifecycleResult<Option<Arc<TracingTarget>>> {
        debug!(%id, "ProjectManager::remove_project: called");
        let (target, pending) = {
            let mut inner = self.inner.lock().await;
            let Some(target) = inner.registry.remove(id, self.config.prune_inclusive_on_remove) else {
                debug!(%id, "ProjectManager::remove_project: not found");
                return Ok(None);
            };
            (target, inner.pending.remove(&id))
        };

        if let Some(pending) = pending {
            pending.timer.abort();
        }
        if let Err(err) = target.force_delete() {
            // A finalize won the race after we detached; state is settled.
            warn!(%id, %err, "ProjectManager::remove_project: target already deleted");
        }
        self.provider.remove_project(id).await.map_err(LifecycleError::storage)?;

        self.bus.pulse();
        info!(%id, "ProjectManager::remove_project: removed");
        Ok(Some(target))
    }

    /// Schedule a deletion after the configured grace period
    ///
    /// Valid from Active only. Returns `None` for unknown ids; otherwise a
    /// receiver resolving with the final [`DeletionOutcome`] once the
    /// physical removal (or the cancellation cleanup) has completed, e.g.
    /// to drive an undo notification. A durable-removal failure during
    /// finalization is carried through the receiver.
    pub async fn schedule_project_deletion(
        self: &Arc<Self>,
        id: ProjectId,
    ) -> LifecycleResult<Option<oneshot::Receiver<LifecycleResult<DeletionOutcome>>>> {
        debug!(%id, "ProjectManager::schedule_project_deletion: called");
        let (key, outcome_rx) = {
            let mut inner = self.inner.lock().await;
            let Some(target) = inner.registry.lookup(id) else {
                debug!(%id, "ProjectManager::schedule_project_deletion: not found");
                return Ok(None);
            };

            let (key, outcome_rx) = target.set_delete_pending()?;
            let timer = self.spawn_grace_timer(Arc::clone(&target), key);
            inner.pending.insert(id, PendingDeletion { key, timer });
            (key, outcome_rx)
        };

        let (done_tx, done_rx) = oneshot::channel();
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            manager.watch_deletion(id, key, outcome_rx, done_tx).await;
        });

        info!(%id, grace = ?self.config.grace_period, "ProjectManager::schedule_project_deletion: scheduled");
        Ok(Some(done_rx))
    }

    /// Cancel a pending scheduled deletion
    ///
    /// Returns `Ok(false)` for unknown ids. Fails with a state conflict if
    /// the grace timer already finalized (race lost); state is unchanged in
    /// that case. Bookkeeping cleanup happens in the deletion watcher.
    pub async fn cancel_project_deletion(&self, id: ProjectId) -> LifecycleResult<bool> {
        debug!(%id, "ProjectManager::cancel_project_deletion: called");
        let target = { self.inner.lock().await.registry.lookup(id) };
        let Some(target) = target else {
            debug!(%id, "ProjectManager::cancel_project_deletion: not found");
            return Ok(false);
        };

        target.cancel_pending_deletion().inspect_err(|err| {
            warn!(%id, %err, "ProjectManager::cancel_project_deletion: conflict");
        })?;
        info!(%id, "ProjectManager::cancel_project_deletion: canceled");
        Ok(true)
    }

    /// Remove a project whose durable data failed to load
    ///
    /// Skips the deletion-key protocol (the target never became fully
    /// Active): removes durable state and the registry entry, and marks the
    /// in-memory target load-failed so diagnostics can display `reason`.
    /// The inclusive view always retains the entry for that display.
    pub async fn remove_unloaded_project(&self, id: ProjectId, reason: &str) -> LifecycleResult<()> {
        debug!(%id, reason, "ProjectManager::remove_unloaded_project: called");
        let target = {
            let mut inner = self.inner.lock().await;
            if let Some(pending) = inner.pending.remove(&id) {
                pending.timer.abort();
            }
            inner.registry.remove(id, false);
            inner.registry.lookup_inclusive(id)
        };

        self.provider.remove_project(id).await.map_err(LifecycleError::storage)?;
        if let Some(target) = target {
            target.notify_loading_failed(reason);
        }
        self.bus.pulse();
        Ok(())
    }

    /// Flush every registered project's durable data exactly once
    ///
    /// Intended for shutdown. All projects are attempted; the first error
    /// is returned after the sweep completes.
    pub async fn flush_all(&self) -> LifecycleResult<()> {
        let targets = { self.inner.lock().await.registry.list() };
        debug!(count = targets.len(), "ProjectManager::flush_all: called");

        let mut first_err = None;
        for target in targets {
            if let Err(err) = target.data().flush() {
                warn!(id = %target.id(), %err, "ProjectManager::flush_all: flush failed");
                first_err.get_or_insert(LifecycleError::storage(err));
            }
        }
        match first_err {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }

    /// Register a target and pulse listeners
    async fn register(&self, target: Arc<TracingTarget>) -> LifecycleResult<()> {
        let id = target.id();
        {
            let mut inner = self.inner.lock().await;
            if !inner.registry.register(target) {
                return Err(LifecycleError::StateConflict {
                    id,
                    reason: "id already registered",
                });
            }
        }
        self.bus.pulse();
        Ok(())
    }

    /// Start the state-change relay for a target and await its acknowledgment
    ///
    /// The bounded wait is deliberate: registration must not complete with a
    /// dead relay, or every later pulse for this target would be lost.
    /// A timeout is a startup fault surfaced to the caller.
    async fn start_relay(&self, target: &Arc<TracingTarget>) -> LifecycleResult<()> {
        let id = target.id();
        let mut changes = target.subscribe_changes();
        let pulse = self.bus.handle();
        let (ack_tx, ack_rx) = oneshot::channel();

        tokio::spawn(async move {
            if ack_tx.send(()).is_err() {
                return;
            }
            while changes.changed().await.is_ok() {
                pulse.pulse();
            }
            debug!(%id, "state-change relay ended");
        });

        match tokio::time::timeout(self.config.ack_timeout, ack_rx).await {
            Ok(Ok(())) => Ok(()),
            _ => Err(LifecycleError::AckTimeout {
                id,
                timeout: self.config.ack_timeout,
            }),
        }
    }

    /// Arm the one-shot grace timer for a scheduled deletion
    fn spawn_grace_timer(&self, target: Arc<TracingTarget>, key: DeletionKey) -> JoinHandle<()> {
        let grace = self.config.grace_period;
        tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            if let Err(err) = target.finalize_deletion(key) {
                // Expected when a cancel consumed the key first.
                debug!(id = %target.id(), %err, "grace timer: finalize declined");
            }
        })
    }

    /// Await a scheduled deletion's outcome and perform the follow-up work
    ///
    /// The pending entry is claimed only while it still carries this cycle's
    /// key: an interleaved immediate removal (entry gone) or a fresh
    /// schedule after a cancel (entry re-keyed) must not be disturbed. On
    /// finalize: claim, detach the registry entry, remove durable data,
    /// pulse once. On cancel: disarm the timer and clear bookkeeping,
    /// leaving the registry alone. `done_tx` resolves only after the
    /// follow-up work completed, carrying any durable-removal failure.
    async fn watch_deletion(
        self: Arc<Self>,
        id: ProjectId,
        key: DeletionKey,
        outcome_rx: oneshot::Receiver<DeletionOutcome>,
        done_tx: oneshot::Sender<LifecycleResult<DeletionOutcome>>,
    ) {
        let Ok(outcome) = outcome_rx.await else {
            // Target dropped without resolving; nothing left to clean up.
            return;
        };

        let result = match outcome {
            DeletionOutcome::Finalized => {
                let claimed = {
                    let mut inner = self.inner.lock().await;
                    let claimed = inner.pending.get(&id).is_some_and(|p| p.key == key);
                    if claimed {
                        inner.pending.remove(&id);
                        inner.registry.remove(id, self.config.prune_inclusive_on_remove);
                    }
                    claimed
                };
                if !claimed {
                    // An immediate removal already did the work and notified.
                    Ok(outcome)
                } else {
                    match self.provider.remove_project(id).await {
                        Ok(()) => {
                            self.bus.pulse();
                            info!(%id, "watch_deletion: deletion finalized");
                            Ok(outcome)
                        }
                        Err(err) => {
                            warn!(%id, %err, "watch_deletion: durable removal failed");
                            Err(LifecycleError::storage(err))
                        }
                    }
                }
            }
            DeletionOutcome::Canceled => {
                let pending = {
                    let mut inner = self.inner.lock().await;
                    if inner.pending.get(&id).is_some_and(|p| p.key == key) {
                        inner.pending.remove(&id)
                    } else {
                        None
                    }
                };
                if let Some(pending) = pending {
                    pending.timer.abort();
                }
                // Registry untouched: the cancel path restored the target.
                info!(%id, "watch_deletion: deletion canceled");
                Ok(outcome)
            }
        };

        let _ = done_tx.send(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MemoryProvider;
    use crate::target::{DeletionStateKind, LoadState};

    async fn manager_with(config: ManagerConfig) -> (Arc<ProjectManager>, Arc<MemoryProvider>) {
        let provider = Arc::new(MemoryProvider::new());
        let manager = ProjectManager::new(provider.clone(), config).await.unwrap();
        (manager, provider)
    }

    async fn manager() -> (Arc<ProjectManager>, Arc<MemoryProvider>) {
        manager_with(ManagerConfig::default()).await
    }

    #[tokio::test]
    async fn test_create_ids_unique_and_increasing() {
        let (manager, _) = manager().await;
        let a = manager.create_project().await.unwrap();
        let b = manager.create_project().await.unwrap();
        let c = manager.create_project().await.unwrap();
        assert!(a < b && b < c);
        assert_eq!(manager.len().await, 3);
    }

    #[tokio::test]
    async fn test_allocator_floor_restored_from_provider() {
        let provider = Arc::new(MemoryProvider::with_persisted([3, 7, 2]));
        let manager = ProjectManager::new(provider, ManagerConfig::default()).await.unwrap();

        let loaded = manager.load_persisted_projects().await.unwrap();
        assert_eq!(loaded, 3);

        let next = manager.create_project().await.unwrap();
        assert_eq!(next, ProjectId::new(8));

        let target = manager.get_project(ProjectId::new(3)).await.unwrap();
        assert_eq!(target.load_state(), LoadState::Finished);
    }

    #[tokio::test]
    async fn test_remove_project_detaches_and_later_schedule_is_inert() {
        let (manager, provider) = manager().await;
        let id = manager.create_project().await.unwrap();

        let removed = manager.remove_project(id).await.unwrap().unwrap();
        assert_eq!(removed.deletion_state(), DeletionStateKind::Deleted);
        assert!(manager.get_project(id).await.is_none());
        assert!(!provider.contains(id));

        // Scheduling against the now-detached id has no registry effect
        assert!(manager.schedule_project_deletion(id).await.unwrap().is_none());
        assert!(manager.remove_project(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_inclusive_view_retained_by_default() {
        let (manager, _) = manager().await;
        let id = manager.create_project().await.unwrap();

        manager.remove_project(id).await.unwrap();
        assert!(manager.get_project(id).await.is_none());
        assert!(manager.get_inclusive_project(id).await.is_some());
    }

    #[tokio::test]
    async fn test_inclusive_view_pruned_when_configured() {
        let config = ManagerConfig {
            prune_inclusive_on_remove: true,
            ..ManagerConfig::default()
        };
        let (manager, _) = manager_with(config).await;
        let id = manager.create_project().await.unwrap();

        manager.remove_project(id).await.unwrap();
        assert!(manager.get_inclusive_project(id).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduled_deletion_finalizes_after_grace() {
        let (manager, provider) = manager().await;
        let id = manager.create_project().await.unwrap();

        let done = manager.schedule_project_deletion(id).await.unwrap().unwrap();
        {
            let target = manager.get_project(id).await.unwrap();
            assert_eq!(target.deletion_state(), DeletionStateKind::DeletePending);
        }

        tokio::time::sleep(DEFAULT_GRACE_PERIOD + Duration::from_millis(10)).await;
        assert_eq!(done.await.unwrap().unwrap(), DeletionOutcome::Finalized);
        assert!(manager.get_project(id).await.is_none());
        assert!(!provider.contains(id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_grace_keeps_project() {
        let (manager, provider) = manager().await;
        let id = manager.create_project().await.unwrap();

        let done = manager.schedule_project_deletion(id).await.unwrap().unwrap();
        assert!(manager.cancel_project_deletion(id).await.unwrap());
        assert_eq!(done.await.unwrap().unwrap(), DeletionOutcome::Canceled);

        // Grace period elapses with no removal: the timer was disarmed
        tokio::time::sleep(DEFAULT_GRACE_PERIOD * 2).await;
        let target = manager.get_project(id).await.unwrap();
        assert_eq!(target.deletion_state(), DeletionStateKind::Active);
        assert!(provider.contains(id));

        // Bookkeeping cleared: a fresh schedule works again
        assert!(manager.schedule_project_deletion(id).await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_racing_timer_has_one_winner() {
        let (manager, provider) = manager().await;
        let id = manager.create_project().await.unwrap();

        let done = manager.schedule_project_deletion(id).await.unwrap().unwrap();

        let advance = tokio::time::sleep(DEFAULT_GRACE_PERIOD);
        let cancel = manager.cancel_project_deletion(id);
        let (_, canceled) = tokio::join!(advance, cancel);

        match done.await.unwrap().unwrap() {
            DeletionOutcome::Finalized => {
                assert!(canceled.is_err() || !canceled.unwrap());
                assert!(manager.get_project(id).await.is_none());
                assert!(!provider.contains(id));
            }
            DeletionOutcome::Canceled => {
                assert!(canceled.unwrap());
                assert!(manager.get_project(id).await.is_some());
                assert!(provider.contains(id));
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_finalized_deletion_pulses_and_settles() {
        let (manager, _) = manager().await;
        let id = manager.create_project().await.unwrap();

        let done = manager.schedule_project_deletion(id).await.unwrap().unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        // Subscribe after the DeletePending transition settled
        let mut pulses = manager.subscribe();
        tokio::time::sleep(DEFAULT_GRACE_PERIOD).await;
        assert_eq!(done.await.unwrap().unwrap(), DeletionOutcome::Finalized);

        // The removal produced at least one pulse
        assert!(pulses.try_recv().is_ok());

        // Drain, then verify the settled deletion stays silent
        while pulses.try_recv().is_ok() {}
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(pulses.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_remove_during_pending_deletion_is_exactly_once() {
        let (manager, provider) = manager().await;
        let id = manager.create_project().await.unwrap();

        let done = manager.schedule_project_deletion(id).await.unwrap().unwrap();
        let removed = manager.remove_project(id).await.unwrap();
        assert!(removed.is_some());
        assert!(!provider.contains(id));

        // The scheduled deletion settles as finalized without a second
        // removal or pulse from the watcher
        assert_eq!(done.await.unwrap().unwrap(), DeletionOutcome::Finalized);
        let mut pulses = manager.subscribe();
        tokio::time::sleep(DEFAULT_GRACE_PERIOD * 2).await;
        assert!(pulses.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_after_cancel_finalizes_cleanly() {
        let (manager, provider) = manager().await;
        let id = manager.create_project().await.unwrap();

        // Cancel and re-schedule back to back, before the first cycle's
        // watcher has run its cleanup
        let done1 = manager.schedule_project_deletion(id).await.unwrap().unwrap();
        assert!(manager.cancel_project_deletion(id).await.unwrap());
        let done2 = manager.schedule_project_deletion(id).await.unwrap().unwrap();

        assert_eq!(done1.await.unwrap().unwrap(), DeletionOutcome::Canceled);

        // The stale cycle's cleanup must not disturb the fresh timer
        tokio::time::sleep(DEFAULT_GRACE_PERIOD * 3).await;
        assert_eq!(done2.await.unwrap().unwrap(), DeletionOutcome::Finalized);
        assert!(manager.get_project(id).await.is_none());
        assert!(!provider.contains(id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_finalize_surfaces_durable_removal_failure() {
        let (manager, provider) = manager().await;
        let id = manager.create_project().await.unwrap();
        provider.fail_removals(true);

        let done = manager.schedule_project_deletion(id).await.unwrap().unwrap();
        tokio::time::sleep(DEFAULT_GRACE_PERIOD + Duration::from_millis(10)).await;

        let err = done.await.unwrap().unwrap_err();
        assert!(matches!(err, LifecycleError::Storage(_)));
        // The registry detach already happened; durable data remains
        assert!(manager.get_project(id).await.is_none());
        assert!(provider.contains(id));
    }

    #[tokio::test]
    async fn test_flush_all_flushes_each_project_once() {
        let (manager, provider) = manager().await;
        let a = manager.create_project().await.unwrap();
        let b = manager.create_project().await.unwrap();

        manager.flush_all().await.unwrap();
        assert_eq!(provider.data(a).unwrap().flush_count(), 1);
        assert_eq!(provider.data(b).unwrap().flush_count(), 1);
    }

    #[tokio::test]
    async fn test_remove_unloaded_project_marks_failure() {
        let (manager, provider) = manager().await;
        let id = manager.create_project().await.unwrap();

        manager.remove_unloaded_project(id, "corrupt metadata").await.unwrap();
        assert!(manager.get_project(id).await.is_none());
        assert!(!provider.contains(id));

        let target = manager.get_inclusive_project(id).await.unwrap();
        assert_eq!(target.load_state(), LoadState::Failed("corrupt metadata".into()));
    }

    #[tokio::test]
    async fn test_rename_relays_a_pulse() {
        let (manager, _) = manager().await;
        let id = manager.create_project().await.unwrap();
        let target = manager.get_project(id).await.unwrap();

        let mut pulses = manager.subscribe();
        target.set_name("renamed");

        let pulse = tokio::time::timeout(Duration::from_secs(1), pulses.recv()).await;
        assert!(pulse.is_ok());
        assert_eq!(manager.get_project(id).await.unwrap().name(), "renamed");
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_ack_timeout_is_a_startup_fault() {
        let config = ManagerConfig {
            ack_timeout: Duration::ZERO,
            ..ManagerConfig::default()
        };
        let (manager, _) = manager_with(config).await;

        let err = manager.create_project().await.unwrap_err();
        assert!(matches!(err, LifecycleError::AckTimeout { .. }));
    }

    #[tokio::test]
    async fn test_cancel_without_pending_deletion_is_a_conflict() {
        let (manager, _) = manager().await;
        let id = manager.create_project().await.unwrap();

        let err = manager.cancel_project_deletion(id).await.unwrap_err();
        assert!(matches!(err, LifecycleError::StateConflict { .. }));
        assert!(!manager.cancel_project_deletion(ProjectId::new(999)).await.unwrap());
    }
}
