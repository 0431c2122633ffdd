// # Memory Monitor Store
//
// In-memory implementation of MonitorStore. Nothing survives a restart:
// every monitor is re-created on the next run, so this is only useful for
// tests and throwaway environments.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{MonitorStore, StoredMonitor};

/// In-memory monitor store
#[derive(Debug, Clone, Default)]
pub struct MemoryMonitorStore {
    inner: Arc<RwLock<BTreeMap<String, StoredMonitor>>>,
}

impl MemoryMonitorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored monitors
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl MonitorStore for MemoryMonitorStore {
    async fn get(&self, name: &str) -> Result<Option<StoredMonitor>> {
        Ok(self.inner.read().await.get(name).cloned())
    }

    async fn put(&self, name: &str, record: &StoredMonitor) -> Result<()> {
        self.inner
            .write()
            .await
            .insert(name.to_string(), record.clone());
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<()> {
        self.inner.write().await.remove(name);
        Ok(())
    }

    async fn names(&self) -> Result<Vec<String>> {
        Ok(self.inner.read().await.keys().cloned().collect())
    }

    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use monitor_core::model::{DesiredState, ManagedMonitor};

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryMonitorStore::new();
        assert!(store.is_empty().await);

        let monitor = ManagedMonitor::new(DesiredState::new("payments", "availability"));
        let stored = StoredMonitor::snapshot(&monitor);
        store.put("payments", &stored).await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("payments").await.unwrap(), Some(stored));
        assert_eq!(store.get("other").await.unwrap(), None);

        // clones share storage
        let shared = store.clone();
        shared.remove("payments").await.unwrap();
        assert!(store.is_empty().await);
    }
}
