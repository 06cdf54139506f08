//! Lifecycle Bus - pub/sub fan-out for project list changes
//!
//! The bus delivers payload-free pulses over a tokio broadcast channel.
//! A pulse means "the project list may have changed, re-read it"; consumers
//! never interpret pulse contents or ordering.

use tokio::sync::broadcast;
use tracing::debug;

/// Default channel capacity (pulses)
///
/// Pulses are tiny and consumers coalesce them, so a modest buffer is
/// plenty; a lagging subscriber just re-reads state after catching up.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Payload-free "project list changed" pulse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListChanged;

/// Broadcast bus for lifecycle pulses
///
/// Fired on project add, removal (immediate or finalized), rename, and any
/// per-target state change. Delivery is at-least-once and best-effort:
/// no subscribers is fine, and a full channel drops the oldest pulses.
pub struct LifecycleBus {
    tx: broadcast::Sender<ListChanged>,
}

impl LifecycleBus {
    /// Create a new bus with the given capacity
    pub fn new(capacity: usize) -> Self {
        debug!(capacity, "LifecycleBus::new: creating bus");
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Create a new bus with default capacity
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Emit a pulse to all subscribers
    ///
    /// Fire-and-forget: send errors (no subscribers) are ignored.
    pub fn pulse(&self) {
        debug!("LifecycleBus::pulse");
        let _ = self.tx.send(ListChanged);
    }

    /// Subscribe to receive pulses
    ///
    /// Only pulses emitted after subscription are received. Subscribing or
    /// dropping a receiver while a pulse is in flight is safe.
    pub fn subscribe(&self) -> broadcast::Receiver<ListChanged> {
        debug!("LifecycleBus::subscribe: new subscriber");
        self.tx.subscribe()
    }

    /// Cheap cloneable handle for emitting pulses without owning the bus
    pub fn handle(&self) -> LifecyclePulse {
        LifecyclePulse { tx: self.tx.clone() }
    }

    /// Number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for LifecycleBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

/// Handle for relay tasks to emit pulses without owning the bus
#[derive(Clone)]
pub struct LifecyclePulse {
    tx: broadcast::Sender<ListChanged>,
}

impl LifecyclePulse {
    /// Emit a pulse
    pub fn pulse(&self) {
        let _ = self.tx.send(ListChanged);
    }
}
