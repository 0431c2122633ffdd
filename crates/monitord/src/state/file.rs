// # File Monitor Store
//
// File-based implementation of MonitorStore with crash recovery.
//
// ## Crash Recovery
//
// - Atomic writes: write to `.tmp`, then rename over the state file
// - Automatic backup: the previous state file is copied to `.backup` first
// - Recovery: an unparseable state file falls back to the backup
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "monitors": {
//     "payments-latency": {
//       "monitor": {
//         "desired": { "name": "payments-latency", ... },
//         "externalIdentity": "123e4567-e89b-12d3-a456-426614174000",
//         "observed": { ... },
//         "status": { "ready": "available", "synced": { "state": "success" } }
//       },
//       "last_reconciled": "2025-01-09T12:00:00Z"
//     }
//   }
// }
// ```

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use super::{MonitorStore, StoredMonitor};

/// State file format version
const STATE_FILE_VERSION: &str = "1.0";

/// File-based monitor store with crash recovery
///
/// Every mutation is written through to disk immediately.
#[derive(Debug)]
pub struct FileMonitorStore {
    path: PathBuf,
    state: Arc<RwLock<FileState>>,
}

#[derive(Debug)]
struct FileState {
    monitors: BTreeMap<String, StoredMonitor>,
    dirty: bool,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct StateFileFormat {
    version: String,
    #[serde(default)]
    monitors: BTreeMap<String, StoredMonitor>,
}

impl FileMonitorStore {
    /// Create or load a file monitor store
    ///
    /// Creates the parent directory if needed. A corrupted state file is
    /// replaced by its backup; with no usable backup the store starts empty.
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create state directory {}", parent.display())
            })?;
        }

        let monitors = Self::load_state_with_recovery(&path).await?;

        Ok(Self {
            path,
            state: Arc::new(RwLock::new(FileState {
                monitors,
                dirty: false,
            })),
        })
    }

    async fn load_state_with_recovery(path: &Path) -> Result<BTreeMap<String, StoredMonitor>> {
        let err = match Self::load_state(path).await {
            Ok(monitors) => {
                tracing::debug!("Loaded state from file: {} monitors", monitors.len());
                return Ok(monitors);
            }
            Err(e) => e,
        };

        // only a parse failure counts as corruption; I/O errors propagate
        if err.downcast_ref::<serde_json::Error>().is_none() {
            return Err(err);
        }

        tracing::warn!(
            "State file appears corrupted: {:#}. Attempting recovery from backup.",
            err
        );

        let backup_path = Self::backup_path(path);
        if !backup_path.exists() {
            tracing::warn!("No backup file found. Starting with empty state.");
            return Ok(BTreeMap::new());
        }

        match Self::load_state(&backup_path).await {
            Ok(monitors) => {
                tracing::info!("Recovered state from backup: {} monitors", monitors.len());
                if let Err(restore_err) = fs::copy(&backup_path, path).await {
                    tracing::error!(
                        "Failed to restore state file from backup: {}",
                        restore_err
                    );
                }
                Ok(monitors)
            }
            Err(backup_err) => {
                tracing::error!(
                    "Backup also corrupted: {:#}. Starting with empty state.",
                    backup_err
                );
                Ok(BTreeMap::new())
            }
        }
    }

    async fn load_state(path: &Path) -> Result<BTreeMap<String, StoredMonitor>> {
        if !path.exists() {
            tracing::debug!("State file does not exist: {}", path.display());
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read state file {}", path.display()))?;

        let state_file: StateFileFormat = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file {}", path.display()))?;

        if state_file.version != STATE_FILE_VERSION {
            tracing::warn!(
                "State file version mismatch: expected {}, got {}. Attempting to load anyway.",
                STATE_FILE_VERSION,
                state_file.version
            );
        }

        Ok(state_file.monitors)
    }

    /// Write state to file atomically
    async fn write_state(&self) -> Result<()> {
        let mut state_guard = self.state.write().await;

        let state_file = StateFileFormat {
            version: STATE_FILE_VERSION.to_string(),
            monitors: state_guard.monitors.clone(),
        };
        let json =
            serde_json::to_string_pretty(&state_file).context("Failed to serialize state")?;

        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path)
                .await
                .with_context(|| format!("Failed to create temp file {}", temp_path.display()))?;
            file.write_all(json.as_bytes())
                .await
                .with_context(|| format!("Failed to write temp file {}", temp_path.display()))?;
            file.flush()
                .await
                .with_context(|| format!("Failed to flush temp file {}", temp_path.display()))?;
        }

        if self.path.exists() {
            let backup_path = Self::backup_path(&self.path);
            if let Err(e) = fs::copy(&self.path, &backup_path).await {
                tracing::warn!("Failed to create backup: {}", e);
            }
        }

        fs::rename(&temp_path, &self.path).await.with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        state_guard.dirty = false;
        tracing::trace!("State written to file: {}", self.path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }

    fn backup_path(path: &Path) -> PathBuf {
        let mut backup = path.to_path_buf();
        backup.set_extension("backup");
        backup
    }
}

#[async_trait]
impl MonitorStore for FileMonitorStore {
    async fn get(&self, name: &str) -> Result<Option<StoredMonitor>> {
        let state_guard = self.state.read().await;
        Ok(state_guard.monitors.get(name).cloned())
    }

    async fn put(&self, name: &str, record: &StoredMonitor) -> Result<()> {
        {
            let mut state_guard = self.state.write().await;
            state_guard
                .monitors
                .insert(name.to_string(), record.clone());
            state_guard.dirty = true;
        }

        self.write_state().await
    }

    async fn remove(&self, name: &str) -> Result<()> {
        {
            let mut state_guard = self.state.write().await;
            if state_guard.monitors.remove(name).is_none() {
                return Ok(());
            }
            state_guard.dirty = true;
        }

        self.write_state().await
    }

    async fn names(&self) -> Result<Vec<String>> {
        let state_guard = self.state.read().await;
        Ok(state_guard.monitors.keys().cloned().collect())
    }

    async fn flush(&self) -> Result<()> {
        let dirty = self.state.read().await.dirty;
        if dirty {
            self.write_state().await
        } else {
            Ok(())
        }
    }
}
