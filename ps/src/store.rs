//! Core ProjectStore implementation

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, warn};

use crate::META_FILE;

/// Metadata persisted for a single project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMeta {
    /// Project id (mirrors the directory name)
    pub id: u64,
    /// Display name
    pub name: String,
    /// Creation timestamp (unix ms)
    pub created_at: i64,
}

impl ProjectMeta {
    fn new(id: u64) -> Self {
        Self {
            id,
            name: format!("Project {id}"),
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Handle to one project's durable data
///
/// Mutations are held in memory until [`StoredProject::flush`] writes the
/// metadata file back to disk.
#[derive(Debug)]
pub struct StoredProject {
    dir: PathBuf,
    meta: Mutex<ProjectMeta>,
}

impl StoredProject {
    /// Project id
    pub fn id(&self) -> u64 {
        self.meta.lock().expect("meta lock poisoned").id
    }

    /// Current display name
    pub fn name(&self) -> String {
        self.meta.lock().expect("meta lock poisoned").name.clone()
    }

    /// Update the display name (in memory; call `flush` to persist)
    pub fn set_name(&self, name: impl Into<String>) {
        let mut meta = self.meta.lock().expect("meta lock poisoned");
        meta.name = name.into();
    }

    /// Directory holding this project's files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the metadata file back to disk
    pub fn flush(&self) -> Result<()> {
        let meta = self.meta.lock().expect("meta lock poisoned").clone();
        debug!(id = meta.id, "StoredProject::flush: called");
        let path = self.dir.join(META_FILE);
        let json = serde_json::to_string_pretty(&meta).context("Failed to serialize project metadata")?;
        fs::write(&path, json).context(format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

/// The main project store
pub struct ProjectStore {
    /// Base path for storage
    base_path: PathBuf,
}

impl ProjectStore {
    /// Open or create a project store at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();
        debug!(?base_path, "ProjectStore::open: called");
        fs::create_dir_all(&base_path).context(format!("Failed to create store at {}", base_path.display()))?;
        Ok(Self { base_path })
    }

    fn project_dir(&self, id: u64) -> PathBuf {
        self.base_path.join(id.to_string())
    }

    /// Create durable data for a new project
    ///
    /// Fails if the project directory already exists.
    pub fn create(&self, id: u64) -> Result<StoredProject> {
        debug!(id, "ProjectStore::create: called");
        let dir = self.project_dir(id);
        if dir.exists() {
            return Err(eyre::eyre!("Project {id} already exists at {}", dir.display()));
        }
        fs::create_dir_all(&dir).context(format!("Failed to create project dir {}", dir.display()))?;

        let meta = ProjectMeta::new(id);
        let project = StoredProject {
            dir,
            meta: Mutex::new(meta),
        };
        project.flush()?;
        info!(id, "ProjectStore::create: project created");
        Ok(project)
    }

    /// Whether durable data exists for the given id
    pub fn exists(&self, id: u64) -> bool {
        self.project_dir(id).join(META_FILE).exists()
    }

    /// Load an existing project's durable data
    pub fn load(&self, id: u64) -> Result<StoredProject> {
        debug!(id, "ProjectStore::load: called");
        let dir = self.project_dir(id);
        let path = dir.join(META_FILE);
        let json = fs::read_to_string(&path).context(format!("Failed to read {}", path.display()))?;
        let meta: ProjectMeta =
            serde_json::from_str(&json).context(format!("Failed to parse {}", path.display()))?;
        Ok(StoredProject {
            dir,
            meta: Mutex::new(meta),
        })
    }

    /// Remove a project's durable data
    ///
    /// Idempotent: removing an unknown id is a no-op.
    pub fn remove(&self, id: u64) -> Result<()> {
        debug!(id, "ProjectStore::remove: called");
        let dir = self.project_dir(id);
        if !dir.exists() {
            debug!(id, "ProjectStore::remove: not present, nothing to do");
            return Ok(());
        }
        fs::remove_dir_all(&dir).context(format!("Failed to remove {}", dir.display()))?;
        info!(id, "ProjectStore::remove: project removed");
        Ok(())
    }

    /// List all persisted project ids, ascending
    pub fn list(&self) -> Result<Vec<u64>> {
        debug!("ProjectStore::list: called");
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.base_path).context("Failed to read store directory")? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name();
            match name.to_string_lossy().parse::<u64>() {
                Ok(id) => ids.push(id),
                Err(_) => {
                    warn!(?name, "ProjectStore::list: skipping non-project directory");
                }
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    /// Highest persisted project id, if any
    pub fn max_id(&self) -> Result<Option<u64>> {
        Ok(self.list()?.into_iter().max())
    }
}
