//! Desired-state file loading
//!
//! The file is a JSON object mapping resource names to monitor definitions:
//!
//! ```json
//! {
//!   "payments-latency": {
//!     "name": "payments-latency",
//!     "type": "availability",
//!     "active": true,
//!     "sensors": [{"cluster": "prod-east", "namespaces": ["payments"]}],
//!     "sinks": {"slack": ["#payments-alerts"]},
//!     "variables": {"duration": 30},
//!     "sinksOptions": {"notifyOn": ["Failure"]}
//!   }
//! }
//! ```
//!
//! It is re-read on every cycle, so edits take effect without a restart.

use anyhow::{Context, Result};
use monitor_core::model::DesiredState;
use std::collections::BTreeMap;
use std::path::Path;

/// Resource name → declared monitor
pub type DesiredMonitors = BTreeMap<String, DesiredState>;

/// Load and sanity-check the desired-state file
pub async fn load(path: &Path) -> Result<DesiredMonitors> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read desired state file {}", path.display()))?;

    parse(&content).with_context(|| format!("Invalid desired state file {}", path.display()))
}

fn parse(content: &str) -> Result<DesiredMonitors> {
    let monitors: DesiredMonitors = serde_json::from_str(content)?;

    for (resource, desired) in &monitors {
        if resource.trim().is_empty() {
            anyhow::bail!("resource names cannot be empty");
        }
        if desired.name.trim().is_empty() {
            anyhow::bail!("monitor {:?} has an empty name", resource);
        }
        if desired.kind.trim().is_empty() {
            anyhow::bail!("monitor {:?} has an empty type", resource);
        }
    }

    Ok(monitors)
}
