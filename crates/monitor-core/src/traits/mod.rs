//! Capability traits consumed by the reconciler
//!
//! - [`MonitorClient`]: remote calls against the configuration service and
//!   the cluster directory

pub mod monitor_client;

pub use monitor_client::MonitorClient;
