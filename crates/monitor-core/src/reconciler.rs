//! Reconciliation state machine
//!
//! [`MonitorReconciler`] exposes the four operations a host drives once per
//! reconciliation cycle:
//!
//! ```text
//!              observe
//!   NotTracked ───────▶ absent ──────────▶ create ──▶ Tracked
//!       ▲                                              │
//!       │ invalid identity cleared                     │ observe
//!       │                                              ▼
//!       └──────────── absent ◀──────────────── Tracked-Existing
//!                                                  │        │
//!                                             up to date  drifted ──▶ update
//! ```
//!
//! Each call runs to completion before returning. Nothing here retries,
//! sleeps or spawns; every failure goes straight back to the host, which
//! owns the re-invocation cadence. The host must not run two operations
//! for the same monitor at once.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::classify::{FailureClass, classify};
use crate::diff::{self, Field};
use crate::document::Document;
use crate::error::{ClientError, Error, Operation, Result};
use crate::identity::{self, Identity};
use crate::model::{ManagedMonitor, MonitorSpec, ObservedState, Readiness, SyncStatus};
use crate::traits::MonitorClient;

/// Sensor field naming the cluster a sensor watches
const CLUSTER_FIELD: &str = "cluster";

/// Outcome of [`MonitorReconciler::observe`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Observation {
    /// Whether a live (not soft-deleted) remote record exists
    pub exists: bool,
    /// Whether that record matches the desired state
    pub up_to_date: bool,
    /// Fields that differ, empty when up to date or absent
    pub drifted: Vec<Field>,
}

impl Observation {
    /// No live remote record
    pub fn absent() -> Self {
        Self::default()
    }

    /// A live remote record, with the fields that differ from desired state
    pub fn existing(drifted: Vec<Field>) -> Self {
        Self {
            exists: true,
            up_to_date: drifted.is_empty(),
            drifted,
        }
    }
}

/// Drives Observe/Create/Update/Delete for managed monitors
///
/// The client is injected by the host; the reconciler holds no other state
/// and may be shared across monitors.
pub struct MonitorReconciler {
    client: Box<dyn MonitorClient>,
}

impl MonitorReconciler {
    /// Create a reconciler around a client
    pub fn new(client: Box<dyn MonitorClient>) -> Self {
        Self { client }
    }

    /// Fetch the remote record and compare it with the desired state
    ///
    /// Absence is not a failure, and it resets readiness to `Unknown`. A
    /// missing identity reports absence without a remote call. An invalid
    /// identity is cleared first and never sent. Any other failure leaves
    /// the stored identity and readiness alone.
    pub async fn observe(&self, monitor: &mut ManagedMonitor) -> Result<Observation> {
        let result = self.try_observe(monitor).await;
        if let Ok(observation) = &result
            && !observation.exists
        {
            monitor.status.ready = Readiness::Unknown;
        }
        record_outcome(monitor, result)
    }

    /// Create the remote monitor and adopt its server-assigned identity
    ///
    /// Every cluster referenced by a sensor must exist in the cluster
    /// directory; otherwise nothing is sent to the configuration service.
    pub async fn create(&self, monitor: &mut ManagedMonitor) -> Result<()> {
        let result = self.try_create(monitor).await;
        record_outcome(monitor, result)
    }

    /// Send the complete desired state to an existing remote monitor
    ///
    /// Requires a valid identity. On failure the observed state is left at
    /// its prior value.
    pub async fn update(&self, monitor: &mut ManagedMonitor) -> Result<()> {
        let result = self.try_update(monitor).await;
        record_outcome(monitor, result)
    }

    /// Delete the remote monitor
    ///
    /// Requires a valid identity. Anything other than "no content" from the
    /// service is a failure.
    pub async fn delete(&self, monitor: &mut ManagedMonitor) -> Result<()> {
        let result = self.try_delete(monitor).await;
        record_outcome(monitor, result)
    }

    async fn try_observe(&self, monitor: &mut ManagedMonitor) -> Result<Observation> {
        let name = monitor.desired.name.clone();

        let token = match identity::resolve(&monitor.external_identity) {
            Identity::Missing => {
                debug!("Monitor {} has no external identity yet", name);
                return Ok(Observation::absent());
            }
            Identity::Invalid(id) => {
                warn!(
                    "Monitor {} has invalid external identity {:?}, clearing it",
                    name, id
                );
                monitor.external_identity.clear();
                return Ok(Observation::absent());
            }
            Identity::Valid(token) => token.to_string(),
        };

        let record = match self.client.get_monitor(&token).await {
            Ok(record) => record,
            Err(err) => {
                // only canonical tokens reach the service, so a rejection
                // here is never LikelyWrongIdentity
                if classify(&err, &token) != FailureClass::NotFound {
                    return Err(Error::remote(
                        Operation::GetMonitor,
                        name,
                        Some(token.as_str()),
                        err,
                    ));
                }
                info!("Monitor {} ({}) no longer exists remotely", name, token);
                return Ok(Observation::absent());
            }
        };

        if record.is_deleted {
            info!("Monitor {} ({}) is soft-deleted remotely", name, token);
            return Ok(Observation::absent());
        }

        let desired = monitor.desired.canonicalize()?;
        let drifted = diff::drifted_fields(&desired, &record.spec);
        monitor.observed = ObservedState::from_monitor(&record)?;
        monitor.status.ready = Readiness::Available;

        if drifted.is_empty() {
            debug!("Monitor {} ({}) is up to date", name, token);
            monitor.status.synced = SyncStatus::Success;
        } else {
            let fields: Vec<&str> = drifted.iter().map(Field::as_str).collect();
            info!(
                "Monitor {} ({}) drifted: {}",
                name,
                token,
                fields.join(", ")
            );
        }

        Ok(Observation::existing(drifted))
    }

    async fn try_create(&self, monitor: &mut ManagedMonitor) -> Result<()> {
        let name = monitor.desired.name.clone();
        let spec = monitor.desired.canonicalize()?;

        self.validate_clusters(&name, &spec).await?;

        let created = self
            .client
            .create_monitor(&spec)
            .await
            .map_err(|e| Error::remote(Operation::CreateMonitor, &name, None, e))?;

        if created.id.is_empty() {
            return Err(Error::remote(
                Operation::CreateMonitor,
                &name,
                None,
                ClientError::invalid_response(
                    Operation::CreateMonitor,
                    "created monitor carries no id",
                ),
            ));
        }
        if !identity::is_canonical_token(&created.id) {
            warn!(
                "Service assigned non-canonical ID {:?} to monitor {}",
                created.id, name
            );
        }

        // identity first: nothing below may leave the record untracked
        monitor.external_identity = created.id.clone();
        monitor.status.ready = Readiness::Creating;
        monitor.observed = ObservedState::from_monitor(&created)?;
        monitor.status.synced = SyncStatus::Success;

        info!("Created monitor {} with ID {}", name, created.id);
        Ok(())
    }

    async fn try_update(&self, monitor: &mut ManagedMonitor) -> Result<()> {
        let name = monitor.desired.name.clone();
        let token = require_token(monitor, "update")?;
        let spec = monitor.desired.canonicalize()?;

        let updated = self
            .client
            .update_monitor(&token, &spec)
            .await
            .map_err(|e| {
                Error::remote(Operation::UpdateMonitor, &name, Some(token.as_str()), e)
            })?;

        monitor.observed = ObservedState::from_monitor(&updated)?;
        monitor.status.ready = Readiness::Available;
        monitor.status.synced = SyncStatus::Success;

        info!("Updated monitor {} ({})", name, token);
        Ok(())
    }

    async fn try_delete(&self, monitor: &mut ManagedMonitor) -> Result<()> {
        let name = monitor.desired.name.clone();
        let token = require_token(monitor, "delete")?;

        self.client
            .delete_monitor(&token)
            .await
            .map_err(|e| {
                Error::remote(Operation::DeleteMonitor, &name, Some(token.as_str()), e)
            })?;

        monitor.status.ready = Readiness::Unknown;
        monitor.status.synced = SyncStatus::Success;

        info!("Deleted monitor {} ({})", name, token);
        Ok(())
    }

    /// Fail unless every cluster referenced by a sensor is in the directory
    async fn validate_clusters(&self, name: &str, spec: &MonitorSpec) -> Result<()> {
        let referenced = referenced_clusters(&spec.sensors);
        if referenced.is_empty() {
            debug!("Monitor {} references no clusters", name);
            return Ok(());
        }

        let known = self
            .client
            .list_clusters()
            .await
            .map_err(|e| Error::remote(Operation::ListClusters, name, None, e))?;

        for cluster in referenced {
            if !known.iter().any(|k| k == cluster) {
                warn!("Monitor {} references unknown cluster {}", name, cluster);
                return Err(Error::validation(cluster));
            }
            debug!("Cluster {} exists", cluster);
        }

        Ok(())
    }
}

/// Distinct non-empty cluster names referenced by the sensors
fn referenced_clusters(sensors: &[Document]) -> BTreeSet<&str> {
    sensors
        .iter()
        .filter_map(|sensor| sensor.get(CLUSTER_FIELD))
        .filter_map(Document::as_str)
        .filter(|cluster| !cluster.is_empty())
        .collect()
}

/// The stored token, or a precondition failure naming `operation`
fn require_token(monitor: &ManagedMonitor, operation: &'static str) -> Result<String> {
    match identity::resolve(&monitor.external_identity) {
        Identity::Valid(token) => Ok(token.to_string()),
        Identity::Missing => Err(Error::precondition(
            operation,
            &monitor.desired.name,
            "no external identity",
        )),
        Identity::Invalid(id) => Err(Error::precondition(
            operation,
            &monitor.desired.name,
            format!("invalid external identity {id:?}"),
        )),
    }
}

fn record_outcome<T>(monitor: &mut ManagedMonitor, result: Result<T>) -> Result<T> {
    if let Err(err) = &result {
        monitor.status.synced = SyncStatus::Error(err.to_string());
    }
    result
}
