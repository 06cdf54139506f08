//! TraceKeeper configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::manager::ManagerConfig;

/// Main TraceKeeper configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Lifecycle tunables (grace period, ack bound, pruning)
    pub lifecycle: LifecycleConfig,

    /// Storage configuration
    pub storage: StorageConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Call this early in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        if self.lifecycle.grace_period_secs == 0 {
            return Err(eyre::eyre!("lifecycle.grace_period_secs must be at least 1"));
        }
        if self.lifecycle.subscribe_ack_timeout_ms == 0 {
            return Err(eyre::eyre!("lifecycle.subscribe_ack_timeout_ms must be at least 1"));
        }
        if self.lifecycle.notify_capacity == 0 {
            return Err(eyre::eyre!("lifecycle.notify_capacity must be at least 1"));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .tracekeeper.yml
        let local_config = PathBuf::from(".tracekeeper.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/tracekeeper/tracekeeper.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("tracekeeper").join("tracekeeper.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).context(format!("Failed to read {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&contents).context(format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }
}

/// Lifecycle tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Grace period before a scheduled deletion finalizes, in seconds
    pub grace_period_secs: u64,

    /// Bound on the state-change subscription acknowledgment, in ms
    pub subscribe_ack_timeout_ms: u64,

    /// Whether immediate removal also prunes the inclusive registry view
    pub prune_inclusive_on_remove: bool,

    /// Lifecycle pulse channel capacity
    pub notify_capacity: usize,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            grace_period_secs: 15,
            subscribe_ack_timeout_ms: 1_000,
            prune_inclusive_on_remove: false,
            notify_capacity: 256,
        }
    }
}

impl From<&LifecycleConfig> for ManagerConfig {
    fn from(config: &LifecycleConfig) -> Self {
        Self {
            grace_period: Duration::from_secs(config.grace_period_secs),
            ack_timeout: Duration::from_millis(config.subscribe_ack_timeout_ms),
            prune_inclusive_on_remove: config.prune_inclusive_on_remove,
            notify_capacity: config.notify_capacity,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Project store root; defaults to the platform data directory
    pub root: Option<PathBuf>,
}

impl StorageConfig {
    /// Resolve the store root, falling back to the platform default
    pub fn resolve_root(&self) -> PathBuf {
        self.root.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("tracekeeper")
                .join("projects")
        })
    }
}
