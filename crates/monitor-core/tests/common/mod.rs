//! Test doubles and common utilities for reconciliation contract tests
//!
//! [`MockMonitorClient`] answers from canned responses and counts every
//! call, so tests can assert which remote calls were (or were not) made.

#![allow(dead_code)]

use monitor_core::error::{ClientError, Operation};
use monitor_core::model::{DesiredState, ManagedMonitor, Monitor, MonitorSpec};
use monitor_core::{MonitorClient, RawDocument};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A canonical identity token
pub const TOKEN: &str = "123e4567-e89b-12d3-a456-426614174000";

/// The identity the mock assigns on create
pub const CREATED_TOKEN: &str = "0f0e0d0c-0b0a-4908-8706-050403020100";

/// A mock MonitorClient that tracks calls
pub struct MockMonitorClient {
    list_monitors_count: Arc<AtomicUsize>,
    get_count: Arc<AtomicUsize>,
    create_count: Arc<AtomicUsize>,
    update_count: Arc<AtomicUsize>,
    delete_count: Arc<AtomicUsize>,
    list_clusters_count: Arc<AtomicUsize>,

    /// Record returned by get; `None` answers "not found"
    get_response: Arc<Mutex<Option<Result<Monitor, ClientError>>>>,
    /// Failure for create; success echoes the request with [`CREATED_TOKEN`]
    create_failure: Arc<Mutex<Option<ClientError>>>,
    /// Overrides the id of the created record
    created_id: Arc<Mutex<String>>,
    /// Failure for update; success echoes the request
    update_failure: Arc<Mutex<Option<ClientError>>>,
    /// Failure for delete
    delete_failure: Arc<Mutex<Option<ClientError>>>,
    /// Answer for list_clusters
    clusters: Arc<Mutex<Result<Vec<String>, ClientError>>>,
    /// Records answered by list_monitors
    monitors: Arc<Mutex<Vec<Monitor>>>,

    /// Bodies sent with create
    created_specs: Arc<Mutex<Vec<MonitorSpec>>>,
    /// (id, body) pairs sent with update
    updated_specs: Arc<Mutex<Vec<(String, MonitorSpec)>>>,
    /// Ids sent with delete
    deleted_ids: Arc<Mutex<Vec<String>>>,
}

impl MockMonitorClient {
    pub fn new() -> Self {
        Self {
            list_monitors_count: Arc::new(AtomicUsize::new(0)),
            get_count: Arc::new(AtomicUsize::new(0)),
            create_count: Arc::new(AtomicUsize::new(0)),
            update_count: Arc::new(AtomicUsize::new(0)),
            delete_count: Arc::new(AtomicUsize::new(0)),
            list_clusters_count: Arc::new(AtomicUsize::new(0)),
            get_response: Arc::new(Mutex::new(None)),
            create_failure: Arc::new(Mutex::new(None)),
            created_id: Arc::new(Mutex::new(CREATED_TOKEN.to_string())),
            update_failure: Arc::new(Mutex::new(None)),
            delete_failure: Arc::new(Mutex::new(None)),
            clusters: Arc::new(Mutex::new(Ok(Vec::new()))),
            monitors: Arc::new(Mutex::new(Vec::new())),
            created_specs: Arc::new(Mutex::new(Vec::new())),
            updated_specs: Arc::new(Mutex::new(Vec::new())),
            deleted_ids: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a new MockMonitorClient that shares counters and responses with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            list_monitors_count: Arc::clone(&other.list_monitors_count),
            get_count: Arc::clone(&other.get_count),
            create_count: Arc::clone(&other.create_count),
            update_count: Arc::clone(&other.update_count),
            delete_count: Arc::clone(&other.delete_count),
            list_clusters_count: Arc::clone(&other.list_clusters_count),
            get_response: Arc::clone(&other.get_response),
            create_failure: Arc::clone(&other.create_failure),
            created_id: Arc::clone(&other.created_id),
            update_failure: Arc::clone(&other.update_failure),
            delete_failure: Arc::clone(&other.delete_failure),
            clusters: Arc::clone(&other.clusters),
            monitors: Arc::clone(&other.monitors),
            created_specs: Arc::clone(&other.created_specs),
            updated_specs: Arc::clone(&other.updated_specs),
            deleted_ids: Arc::clone(&other.deleted_ids),
        }
    }

    /// Answer get with this record
    pub fn with_record(self, monitor: Monitor) -> Self {
        *self.get_response.lock().unwrap() = Some(Ok(monitor));
        self
    }

    /// Answer get with this failure
    pub fn with_get_failure(self, err: ClientError) -> Self {
        *self.get_response.lock().unwrap() = Some(Err(err));
        self
    }

    /// Answer list_clusters with these names
    pub fn with_clusters(self, names: &[&str]) -> Self {
        *self.clusters.lock().unwrap() = Ok(names.iter().map(|n| n.to_string()).collect());
        self
    }

    pub fn with_clusters_failure(self, err: ClientError) -> Self {
        *self.clusters.lock().unwrap() = Err(err);
        self
    }

    pub fn with_create_failure(self, err: ClientError) -> Self {
        *self.create_failure.lock().unwrap() = Some(err);
        self
    }

    pub fn with_created_id(self, id: &str) -> Self {
        *self.created_id.lock().unwrap() = id.to_string();
        self
    }

    pub fn with_update_failure(self, err: ClientError) -> Self {
        *self.update_failure.lock().unwrap() = Some(err);
        self
    }

    pub fn with_delete_failure(self, err: ClientError) -> Self {
        *self.delete_failure.lock().unwrap() = Some(err);
        self
    }

    pub fn with_monitors(self, monitors: Vec<Monitor>) -> Self {
        *self.monitors.lock().unwrap() = monitors;
        self
    }

    pub fn list_monitors_count(&self) -> usize {
        self.list_monitors_count.load(Ordering::SeqCst)
    }

    pub fn get_count(&self) -> usize {
        self.get_count.load(Ordering::SeqCst)
    }

    pub fn create_count(&self) -> usize {
        self.create_count.load(Ordering::SeqCst)
    }

    pub fn update_count(&self) -> usize {
        self.update_count.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.delete_count.load(Ordering::SeqCst)
    }

    pub fn list_clusters_count(&self) -> usize {
        self.list_clusters_count.load(Ordering::SeqCst)
    }

    /// Total number of remote calls of any kind
    pub fn total_calls(&self) -> usize {
        self.list_monitors_count()
            + self.get_count()
            + self.create_count()
            + self.update_count()
            + self.delete_count()
            + self.list_clusters_count()
    }

    pub fn created_specs(&self) -> Vec<MonitorSpec> {
        self.created_specs.lock().unwrap().clone()
    }

    pub fn updated_specs(&self) -> Vec<(String, MonitorSpec)> {
        self.updated_specs.lock().unwrap().clone()
    }

    pub fn deleted_ids(&self) -> Vec<String> {
        self.deleted_ids.lock().unwrap().clone()
    }
}

impl Default for MockMonitorClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl MonitorClient for MockMonitorClient {
    async fn list_monitors(&self) -> Result<Vec<Monitor>, ClientError> {
        self.list_monitors_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.monitors.lock().unwrap().clone())
    }

    async fn get_monitor(&self, id: &str) -> Result<Monitor, ClientError> {
        self.get_count.fetch_add(1, Ordering::SeqCst);
        match self.get_response.lock().unwrap().clone() {
            Some(response) => response,
            None => Err(ClientError::not_found(id)),
        }
    }

    async fn create_monitor(&self, spec: &MonitorSpec) -> Result<Monitor, ClientError> {
        self.create_count.fetch_add(1, Ordering::SeqCst);
        self.created_specs.lock().unwrap().push(spec.clone());
        if let Some(err) = self.create_failure.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(Monitor {
            id: self.created_id.lock().unwrap().clone(),
            created_at: "2025-01-09T12:00:00Z".to_string(),
            spec: spec.clone(),
            ..Monitor::default()
        })
    }

    async fn update_monitor(&self, id: &str, spec: &MonitorSpec) -> Result<Monitor, ClientError> {
        self.update_count.fetch_add(1, Ordering::SeqCst);
        self.updated_specs
            .lock()
            .unwrap()
            .push((id.to_string(), spec.clone()));
        if let Some(err) = self.update_failure.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(Monitor {
            id: id.to_string(),
            updated_at: "2025-01-09T12:30:00Z".to_string(),
            spec: spec.clone(),
            ..Monitor::default()
        })
    }

    async fn delete_monitor(&self, id: &str) -> Result<(), ClientError> {
        self.delete_count.fetch_add(1, Ordering::SeqCst);
        self.deleted_ids.lock().unwrap().push(id.to_string());
        match self.delete_failure.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn list_clusters(&self) -> Result<Vec<String>, ClientError> {
        self.list_clusters_count.fetch_add(1, Ordering::SeqCst);
        self.clusters.lock().unwrap().clone()
    }

    fn client_name(&self) -> &'static str {
        "mock"
    }
}

/// A desired monitor watching two clusters
pub fn desired_monitor() -> DesiredState {
    let mut desired = DesiredState::new("payments-latency", "availability");
    desired.sensors = vec![
        RawDocument::new(r#"{"cluster":"prod-east","namespaces":["payments"]}"#),
        RawDocument::new(r#"{"cluster":"prod-west","namespaces":["payments"]}"#),
    ];
    desired.sinks = RawDocument::new(r##"{"slack":["#payments-alerts"]}"##);
    desired.variables = RawDocument::new(r#"{"duration":30,"minAvailable":"80%"}"#);
    desired
        .sinks_options
        .insert("notifyOn".to_string(), vec!["Failure".to_string()]);
    desired
}

/// The remote record that exactly matches `desired`
pub fn record_for(desired: &DesiredState, id: &str) -> Monitor {
    Monitor {
        id: id.to_string(),
        created_at: "2025-01-09T12:00:00Z".to_string(),
        updated_at: "2025-01-09T12:00:00Z".to_string(),
        is_deleted: false,
        spec: desired.canonicalize().unwrap(),
    }
}

/// A managed monitor tracked under `id`
pub fn tracked(id: &str) -> ManagedMonitor {
    ManagedMonitor::with_identity(desired_monitor(), id)
}

/// A client error with only a status
pub fn status_error(operation: Operation, status: u16) -> ClientError {
    ClientError::status(operation, status, "")
}
