//! Lifecycle notification fan-out

mod bus;

pub use bus::{LifecycleBus, LifecyclePulse, ListChanged, DEFAULT_CHANNEL_CAPACITY};
