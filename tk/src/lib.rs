//! TraceKeeper - project lifecycle manager for long-lived tracing sessions
//!
//! TraceKeeper tracks a set of tracing targets (one per project), assigns
//! them stable monotonic identifiers, coordinates creation and deletion, and
//! broadcasts lifecycle pulses to listeners such as a project list view.
//!
//! # Core Concepts
//!
//! - **Monotonic Ids**: project ids are never reused, even after deletion
//! - **Grace-Period Deletion**: scheduled deletions can be canceled until a
//!   one-shot timer finalizes them; a single-use key guarantees exactly one
//!   of {finalize, cancel} wins
//! - **Pulse, Don't Push**: lifecycle notifications carry no payload;
//!   listeners re-read current state instead of interpreting events
//! - **Durable Data Elsewhere**: per-project storage lives behind the
//!   [`provider::DataProvider`] seam (see the `projectstore` crate)
//!
//! # Modules
//!
//! - [`domain`] - Project ids and the monotonic allocator
//! - [`target`] - Per-project deletion state machine
//! - [`registry`] - Primary and inclusive project maps
//! - [`events`] - Lifecycle pulse bus
//! - [`manager`] - The façade composing all of the above
//! - [`provider`] - Durable-storage collaborator contract
//! - [`error`] - Lifecycle error taxonomy
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod manager;
pub mod provider;
pub mod registry;
pub mod target;

pub use error::{LifecycleError, LifecycleResult};
pub use manager::{ManagerConfig, ProjectManager};
