//! One reconciliation cycle over every managed monitor
//!
//! For each desired monitor: Observe, then Create when absent or Update when
//! drifted, then persist. Monitors still in the store but no longer desired
//! are deleted. A failing monitor is logged and retried on the next cycle;
//! it never stops the others.

use anyhow::Result;
use monitor_core::identity::{self, Identity};
use monitor_core::model::ManagedMonitor;
use monitor_core::MonitorReconciler;
use tracing::{debug, error, info, warn};

use crate::desired::DesiredMonitors;
use crate::state::{MonitorStore, StoredMonitor};

/// What a cycle did to one monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Unchanged,
    Created,
    Updated,
}

/// Per-cycle counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub unchanged: usize,
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub failed: usize,
}

impl std::fmt::Display for CycleReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} unchanged, {} created, {} updated, {} deleted, {} failed",
            self.unchanged, self.created, self.updated, self.deleted, self.failed
        )
    }
}

/// Reconcile one monitor: Observe, then Create or Update as needed
pub async fn reconcile_monitor(
    reconciler: &MonitorReconciler,
    monitor: &mut ManagedMonitor,
) -> monitor_core::Result<Action> {
    let observation = reconciler.observe(monitor).await?;

    if !observation.exists {
        reconciler.create(monitor).await?;
        Ok(Action::Created)
    } else if !observation.up_to_date {
        reconciler.update(monitor).await?;
        Ok(Action::Updated)
    } else {
        Ok(Action::Unchanged)
    }
}

/// Run one cycle over every desired and every orphaned monitor
///
/// Only storage failures abort the cycle.
pub async fn run_cycle(
    reconciler: &MonitorReconciler,
    store: &dyn MonitorStore,
    desired: &DesiredMonitors,
) -> Result<CycleReport> {
    let mut report = CycleReport::default();

    for (resource, declared) in desired {
        let mut monitor = match store.get(resource).await? {
            Some(stored) => stored.resume(declared.clone()),
            None => ManagedMonitor::new(declared.clone()),
        };

        match reconcile_monitor(reconciler, &mut monitor).await {
            Ok(Action::Unchanged) => report.unchanged += 1,
            Ok(Action::Created) => report.created += 1,
            Ok(Action::Updated) => report.updated += 1,
            Err(e) => {
                error!("Failed to reconcile {}: {}", resource, e);
                report.failed += 1;
            }
        }

        // identity and status changes are kept even when the step failed
        store.put(resource, &StoredMonitor::snapshot(&monitor)).await?;
    }

    for resource in store.names().await? {
        if desired.contains_key(&resource) {
            continue;
        }
        let Some(stored) = store.get(&resource).await? else {
            continue;
        };

        let mut monitor = stored.monitor;
        if let Identity::Valid(_) = identity::resolve(&monitor.external_identity) {
            if let Err(e) = reconciler.delete(&mut monitor).await {
                error!("Failed to delete {}: {}", resource, e);
                report.failed += 1;
                store.put(&resource, &StoredMonitor::snapshot(&monitor)).await?;
                continue;
            }
            report.deleted += 1;
        } else {
            warn!(
                "Dropping {} from state: no remote monitor to delete",
                resource
            );
        }

        store.remove(&resource).await?;
    }

    if report.failed > 0 {
        warn!("Cycle finished with failures: {}", report);
    } else if report.created + report.updated + report.deleted > 0 {
        info!("Cycle finished: {}", report);
    } else {
        debug!("Cycle finished: {}", report);
    }

    Ok(report)
}
