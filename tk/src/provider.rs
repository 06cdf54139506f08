//! Durable-storage collaborator contract
//!
//! The lifecycle core never touches disks directly; it drives a
//! [`DataProvider`] that owns durable per-project state. [`StoreProvider`]
//! adapts the `projectstore` crate; [`MemoryProvider`] backs tests and
//! embedded use.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use eyre::Result;
use tracing::debug;

use projectstore::{ProjectStore, StoredProject};

use crate::domain::ProjectId;

/// Handle to one project's durable data
///
/// Mutations may be buffered; `flush` makes them durable.
pub trait ProjectData: Send + Sync {
    /// Project id this data belongs to
    fn id(&self) -> ProjectId;

    /// Current display name
    fn name(&self) -> String;

    /// Update the display name
    fn set_name(&self, name: &str);

    /// Persist buffered state
    fn flush(&self) -> Result<()>;
}

/// Durable storage for project state
///
/// Implementations must be idempotent on remove and must not reuse ids.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Create-or-load durable data for the given id
    async fn get_project(&self, id: ProjectId) -> Result<Arc<dyn ProjectData>>;

    /// Remove durable data; unknown ids are a no-op
    async fn remove_project(&self, id: ProjectId) -> Result<()>;

    /// All persisted project ids
    async fn project_list(&self) -> Result<Vec<ProjectId>>;

    /// Highest persisted id, if any
    async fn max_project_id(&self) -> Result<Option<ProjectId>>;
}

/// [`ProjectData`] backed by a `projectstore` directory
struct StoredProjectData {
    id: ProjectId,
    inner: StoredProject,
}

impl ProjectData for StoredProjectData {
    fn id(&self) -> ProjectId {
        self.id
    }

    fn name(&self) -> String {
        self.inner.name()
    }

    fn set_name(&self, name: &str) {
        self.inner.set_name(name);
    }

    fn flush(&self) -> Result<()> {
        self.inner.flush()
    }
}

/// [`DataProvider`] over an on-disk [`ProjectStore`]
pub struct StoreProvider {
    store: Arc<ProjectStore>,
}

impl StoreProvider {
    pub fn new(store: Arc<ProjectStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl DataProvider for StoreProvider {
    async fn get_project(&self, id: ProjectId) -> Result<Arc<dyn ProjectData>> {
        debug!(%id, "StoreProvider::get_project: called");
        let inner = if self.store.exists(id.get()) {
            self.store.load(id.get())?
        } else {
            self.store.create(id.get())?
        };
        Ok(Arc::new(StoredProjectData { id, inner }))
    }

    async fn remove_project(&self, id: ProjectId) -> Result<()> {
        debug!(%id, "StoreProvider::remove_project: called");
        self.store.remove(id.get())
    }

    async fn project_list(&self) -> Result<Vec<ProjectId>> {
        Ok(self.store.list()?.into_iter().map(ProjectId::new).collect())
    }

    async fn max_project_id(&self) -> Result<Option<ProjectId>> {
        Ok(self.store.max_id()?.map(ProjectId::new))
    }
}

/// In-memory [`ProjectData`] that counts flushes
pub struct MemoryProjectData {
    id: ProjectId,
    name: Mutex<String>,
    flushes: AtomicUsize,
}

impl MemoryProjectData {
    pub fn new(id: ProjectId) -> Self {
        Self {
            id,
            name: Mutex::new(format!("Project {id}")),
            flushes: AtomicUsize::new(0),
        }
    }

    /// Number of times `flush` was called
    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }
}

impl ProjectData for MemoryProjectData {
    fn id(&self) -> ProjectId {
        self.id
    }

    fn name(&self) -> String {
        self.name.lock().expect("name lock poisoned").clone()
    }

    fn set_name(&self, name: &str) {
        *self.name.lock().expect("name lock poisoned") = name.to_string();
    }

    fn flush(&self) -> Result<()> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// In-memory [`DataProvider`] for tests and embedded use
#[derive(Default)]
pub struct MemoryProvider {
    projects: Mutex<HashMap<ProjectId, Arc<MemoryProjectData>>>,
    fail_removals: AtomicBool,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed persisted projects, as if left over from an earlier run
    pub fn with_persisted(ids: impl IntoIterator<Item = u64>) -> Self {
        let provider = Self::new();
        {
            let mut projects = provider.projects.lock().expect("projects lock poisoned");
            for raw in ids {
                let id = ProjectId::new(raw);
                projects.insert(id, Arc::new(MemoryProjectData::new(id)));
            }
        }
        provider
    }

    /// Direct handle to one project's data (test inspection)
    pub fn data(&self, id: ProjectId) -> Option<Arc<MemoryProjectData>> {
        self.projects.lock().expect("projects lock poisoned").get(&id).cloned()
    }

    /// Whether durable data currently exists for the id
    pub fn contains(&self, id: ProjectId) -> bool {
        self.projects.lock().expect("projects lock poisoned").contains_key(&id)
    }

    /// Make subsequent removals fail, for exercising storage-error paths
    pub fn fail_removals(&self, fail: bool) {
        self.fail_removals.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl DataProvider for MemoryProvider {
    async fn get_project(&self, id: ProjectId) -> Result<Arc<dyn ProjectData>> {
        let mut projects = self.projects.lock().expect("projects lock poisoned");
        let data = projects
            .entry(id)
            .or_insert_with(|| Arc::new(MemoryProjectData::new(id)))
            .clone();
        Ok(data)
    }

    async fn remove_project(&self, id: ProjectId) -> Result<()> {
        if self.fail_removals.load(Ordering::SeqCst) {
            return Err(eyre::eyre!("removal failure injected for project {id}"));
        }
        self.projects.lock().expect("projects lock poisoned").remove(&id);
        Ok(())
    }

    async fn project_list(&self) -> Result<Vec<ProjectId>> {
        let mut ids: Vec<_> = self.projects.lock().expect("projects lock poisoned").keys().copied().collect();
        ids.sort_unstable();
        Ok(ids)
    }

    async fn max_project_id(&self) -> Result<Option<ProjectId>> {
        Ok(self.projects.lock().expect("projects lock poisoned").keys().copied().max())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use projectstore::ProjectStore;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_store_provider_roundtrip() {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(ProjectStore::open(temp.path()).unwrap());
        let provider = StoreProvider::new(store);

        let id = ProjectId::new(5);
        let data = provider.get_project(id).await.unwrap();
        data.set_name("renamed");
        data.flush().unwrap();

        // A second get loads the persisted state rather than re-creating
        let again = provider.get_project(id).await.unwrap();
        assert_eq!(again.name(), "renamed");
        assert_eq!(provider.project_list().await.unwrap(), vec![id]);
        assert_eq!(provider.max_project_id().await.unwrap(), Some(id));

        provider.remove_project(id).await.unwrap();
        provider.remove_project(id).await.unwrap();
        assert_eq!(provider.max_project_id().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_provider_seeded_listing() {
        let provider = MemoryProvider::with_persisted([3, 7, 2]);
        let ids = provider.project_list().await.unwrap();
        assert_eq!(ids, vec![ProjectId::new(2), ProjectId::new(3), ProjectId::new(7)]);
        assert_eq!(provider.max_project_id().await.unwrap(), Some(ProjectId::new(7)));
    }
}
