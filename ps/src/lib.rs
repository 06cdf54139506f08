//! ProjectStore - durable per-project storage for TraceKeeper
//!
//! Each project gets its own directory under the store's base path with a
//! JSON metadata file. Trace payload files live alongside the metadata and
//! are opaque to this crate.
//!
//! # Layout
//!
//! ```text
//! .projectstore/
//! └── {project_id}/
//!     ├── project.json     # ProjectMeta
//!     └── ...              # trace payload files (opaque)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use projectstore::ProjectStore;
//!
//! let store = ProjectStore::open(".projectstore")?;
//! let project = store.create(1)?;
//! project.set_name("first trace");
//! project.flush()?;
//! ```

mod store;

pub use store::{ProjectMeta, ProjectStore, StoredProject};

/// File name of the per-project metadata file
pub const META_FILE: &str = "project.json";
