// # monitor-core
//
// Reconciliation core for real-time monitor definitions held by a hosted
// monitor configuration service.
//
// ## Architecture Overview
//
// - **Identity Resolver** (`identity`): classifies the stored external identity
// - **State Normalizer** (`document`): decodes opaque structured fields into
//   comparable documents and back
// - **Diff Engine** (`diff`): field-by-field structural comparison
// - **Error Classification** (`classify`): which lookup failures mean "absent"
// - **MonitorReconciler** (`reconciler`): Observe, Create, Update and Delete
// - **MonitorClient** (`traits`): the remote calls the reconciler consumes
//
// ## Design Principles
//
// 1. **Injected client**: the host builds the client and hands it over
// 2. **No retries**: every failure goes back to the host
// 3. **Self-healing identity**: malformed identities are cleared, not looped on

pub mod classify;
pub mod config;
pub mod diff;
pub mod document;
pub mod error;
pub mod identity;
pub mod model;
pub mod reconciler;
pub mod traits;

// Re-export core types for convenience
pub use config::ClientConfig;
pub use document::{Document, RawDocument};
pub use error::{ClientError, Error, Operation, Result};
pub use identity::Identity;
pub use model::{
    DesiredState, ManagedMonitor, Monitor, MonitorSpec, MonitorStatus, ObservedState, Readiness,
    SyncStatus,
};
pub use reconciler::{MonitorReconciler, Observation};
pub use traits::MonitorClient;
