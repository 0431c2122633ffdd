// # Monitor State Store
//
// Persists what the reconciler learns about each managed monitor between
// cycles and across restarts: the external identity, the last observed
// record and the status conditions.
//
// ## Implementations
//
// - `FileMonitorStore`: JSON file with atomic writes and backup recovery
// - `MemoryMonitorStore`: in-memory, for tests

pub mod file;
#[cfg(test)]
pub mod memory;

pub use file::FileMonitorStore;
#[cfg(test)]
pub use memory::MemoryMonitorStore;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use monitor_core::model::{DesiredState, ManagedMonitor};
use serde::{Deserialize, Serialize};

/// Persisted state for one managed monitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMonitor {
    /// The monitor as of the end of its last cycle
    pub monitor: ManagedMonitor,
    /// When that cycle finished
    pub last_reconciled: DateTime<Utc>,
}

impl StoredMonitor {
    /// Snapshot a monitor at the end of a cycle
    pub fn snapshot(monitor: &ManagedMonitor) -> Self {
        Self {
            monitor: monitor.clone(),
            last_reconciled: Utc::now(),
        }
    }

    /// Resume tracking with a (possibly changed) desired state
    pub fn resume(self, desired: DesiredState) -> ManagedMonitor {
        ManagedMonitor {
            desired,
            ..self.monitor
        }
    }
}

/// Trait for monitor state store implementations
///
/// Keys are resource names from the desired-state file.
///
/// # Thread Safety
///
/// All methods must be safe to call concurrently from multiple tasks.
#[async_trait]
pub trait MonitorStore: Send + Sync {
    /// Get the stored state for a resource
    async fn get(&self, name: &str) -> Result<Option<StoredMonitor>>;

    /// Create or replace the stored state for a resource
    async fn put(&self, name: &str, record: &StoredMonitor) -> Result<()>;

    /// Forget a resource
    async fn remove(&self, name: &str) -> Result<()>;

    /// Names of every stored resource
    async fn names(&self) -> Result<Vec<String>>;

    /// Persist any pending changes
    async fn flush(&self) -> Result<()>;
}
