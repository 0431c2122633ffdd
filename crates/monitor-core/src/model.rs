//! Monitor data model
//!
//! - [`DesiredState`]: what the caller declared, structured fields still encoded
//! - [`ObservedState`]: the last record fetched from the service, same shape plus
//!   server-assigned fields
//! - [`MonitorSpec`]: the canonical (decoded) form of either; also the body sent
//!   on create and update
//! - [`Monitor`]: a record as the service returns it
//! - [`ManagedMonitor`]: everything the reconciler reads and writes for one resource

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::document::{self, Document, RawDocument};
use crate::error::Result;

/// Sink option name → ordered values
pub type SinksOptions = BTreeMap<String, Vec<String>>;

/// Caller-declared configuration for a monitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesiredState {
    /// Monitor name
    pub name: String,

    /// Sensor definitions, order significant
    #[serde(default)]
    pub sensors: Vec<RawDocument>,

    /// Sink configuration
    #[serde(default)]
    pub sinks: RawDocument,

    /// Whether the monitor is active
    #[serde(default = "default_active")]
    pub active: bool,

    /// Monitor type tag
    #[serde(rename = "type")]
    pub kind: String,

    /// Optional variables document
    #[serde(default, skip_serializing_if = "RawDocument::is_absent")]
    pub variables: RawDocument,

    /// Optional sink options
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sinks_options: SinksOptions,
}

fn default_active() -> bool {
    true
}

impl DesiredState {
    /// Create a desired state with no sensors, sinks or variables
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sensors: Vec::new(),
            sinks: RawDocument::absent(),
            active: true,
            kind: kind.into(),
            variables: RawDocument::absent(),
            sinks_options: SinksOptions::new(),
        }
    }

    /// Decode every structured field into the canonical form
    pub fn canonicalize(&self) -> Result<MonitorSpec> {
        Ok(MonitorSpec {
            name: self.name.clone(),
            sensors: document::decode_objects(&self.sensors, "sensors")?,
            sinks: document::decode_object(&self.sinks, "sinks")?,
            active: self.active,
            kind: self.kind.clone(),
            variables: document::decode_object(&self.variables, "variables")?,
            sinks_options: self.sinks_options.clone(),
        })
    }
}

/// Last-known remote state of a monitor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservedState {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sensors: Vec<RawDocument>,
    #[serde(default)]
    pub sinks: RawDocument,
    #[serde(default)]
    pub active: bool,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub variables: RawDocument,
    #[serde(default)]
    pub sinks_options: SinksOptions,
}

impl ObservedState {
    /// Re-encode a fetched record into the persisted form
    pub fn from_monitor(monitor: &Monitor) -> Result<Self> {
        let spec = &monitor.spec;
        Ok(Self {
            id: monitor.id.clone(),
            created_at: monitor.created_at.clone(),
            updated_at: monitor.updated_at.clone(),
            is_deleted: monitor.is_deleted,
            name: spec.name.clone(),
            sensors: document::encode_all(&spec.sensors, "sensors")?,
            sinks: document::encode_optional(spec.sinks.as_ref(), "sinks")?,
            active: spec.active,
            kind: spec.kind.clone(),
            variables: document::encode_optional(spec.variables.as_ref(), "variables")?,
            sinks_options: spec.sinks_options.clone(),
        })
    }

    /// Decode the persisted record back into the canonical form
    pub fn canonicalize(&self) -> Result<MonitorSpec> {
        Ok(MonitorSpec {
            name: self.name.clone(),
            sensors: document::decode_objects(&self.sensors, "observed sensors")?,
            sinks: document::decode_object(&self.sinks, "observed sinks")?,
            active: self.active,
            kind: self.kind.clone(),
            variables: document::decode_object(&self.variables, "observed variables")?,
            sinks_options: self.sinks_options.clone(),
        })
    }
}

/// Canonical monitor definition, and the create/update request body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorSpec {
    pub name: String,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub sensors: Vec<Document>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sinks: Option<Document>,

    #[serde(default)]
    pub active: bool,

    #[serde(default, rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Document>,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub sinks_options: SinksOptions,
}

/// A monitor record as returned by the configuration service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Monitor {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub created_at: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub updated_at: String,

    /// Soft-delete marker; a deleted record may still be fetchable
    #[serde(default)]
    pub is_deleted: bool,

    #[serde(flatten)]
    pub spec: MonitorSpec,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Readiness of the remote monitor, as last reported by the reconciler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    #[default]
    Unknown,
    /// Create accepted, not yet observed
    Creating,
    /// Observed and present
    Available,
}

/// Outcome of the last reconciliation step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum SyncStatus {
    #[default]
    Unknown,
    Success,
    Error(String),
}

/// Status conditions attached to a managed monitor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorStatus {
    #[serde(default)]
    pub ready: Readiness,
    #[serde(default)]
    pub synced: SyncStatus,
}

/// One managed monitor: declared state plus everything the reconciler tracks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedMonitor {
    pub desired: DesiredState,

    /// Server-assigned identity; empty until created
    #[serde(default)]
    pub external_identity: String,

    #[serde(default)]
    pub observed: ObservedState,

    #[serde(default)]
    pub status: MonitorStatus,
}

impl ManagedMonitor {
    /// A resource that has never been created remotely
    pub fn new(desired: DesiredState) -> Self {
        Self {
            desired,
            external_identity: String::new(),
            observed: ObservedState::default(),
            status: MonitorStatus::default(),
        }
    }

    /// A resource already tied to a remote identity
    pub fn with_identity(desired: DesiredState, identity: impl Into<String>) -> Self {
        Self {
            external_identity: identity.into(),
            ..Self::new(desired)
        }
    }
}
