// # Monitor Client Trait
//
// Defines the remote calls the reconciler needs from the monitor
// configuration service.
//
// ## Implementations
//
// - HTTP: `monitor-client-http` crate
// - Tests: counting mocks under `tests/common`
//
// ## Usage
//
// ```rust,ignore
// use monitor_core::{MonitorClient, MonitorReconciler};
//
// let client: Box<dyn MonitorClient> = /* MonitorClient implementation */;
// let reconciler = MonitorReconciler::new(client);
// ```

use async_trait::async_trait;

use crate::error::ClientError;
use crate::model::{Monitor, MonitorSpec};

/// Trait for monitor configuration service clients
///
/// Each method performs exactly one remote call and reports its outcome.
///
/// # Thread Safety
///
/// Implementations must be usable across async tasks.
///
/// # Boundaries
///
/// A client performs calls against its configured endpoints and nothing
/// else. It never retries, never caches records between calls, and never
/// decides whether a monitor needs to change; the reconciler and its host
/// own those decisions.
///
/// Timeouts and cancellations must surface as [`ClientError::Transport`],
/// never as [`ClientError::NotFound`].
#[async_trait]
pub trait MonitorClient: Send + Sync {
    /// List every monitor visible to the credentials
    async fn list_monitors(&self) -> Result<Vec<Monitor>, ClientError>;

    /// Fetch one monitor by identity
    ///
    /// # Returns
    ///
    /// - `Ok(Monitor)`: the record, possibly soft-deleted
    /// - `Err(ClientError::NotFound)`: the service has no such record
    /// - `Err(_)`: any other failure
    async fn get_monitor(&self, id: &str) -> Result<Monitor, ClientError>;

    /// Create a monitor; the returned record carries the server-assigned identity
    async fn create_monitor(&self, spec: &MonitorSpec) -> Result<Monitor, ClientError>;

    /// Replace the monitor's configuration with `spec`
    ///
    /// The full desired representation is sent every time, not a delta.
    async fn update_monitor(&self, id: &str, spec: &MonitorSpec)
    -> Result<Monitor, ClientError>;

    /// Delete a monitor
    async fn delete_monitor(&self, id: &str) -> Result<(), ClientError>;

    /// Names of every cluster known to the cluster directory
    async fn list_clusters(&self) -> Result<Vec<String>, ClientError>;

    /// Client name (for logging/debugging)
    fn client_name(&self) -> &'static str;
}
