//! Client configuration
//!
//! Settings shared by every [`MonitorClient`](crate::MonitorClient)
//! implementation that talks to the hosted service.

use serde::{Deserialize, Serialize};

/// Default monitor configuration endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.komodor.com/api/v2/realtime-monitors/config";

/// Default cluster directory endpoint
pub const DEFAULT_CLUSTERS_URL: &str = "https://api.komodor.com/api/v2/clusters";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Connection settings for the monitor configuration service
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API key sent with every request
    pub api_key: String,

    /// Monitor collection URL; items live at `{base_url}/{id}`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Cluster directory URL
    #[serde(default = "default_clusters_url")]
    pub clusters_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ClientConfig {
    /// Configuration with default endpoints for the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
            clusters_url: default_clusters_url(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Point the client at a different monitor collection
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Point the client at a different cluster directory
    pub fn with_clusters_url(mut self, clusters_url: impl Into<String>) -> Self {
        self.clusters_url = clusters_url.into();
        self
    }

    /// Override the per-request timeout
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.api_key.trim().is_empty() {
            return Err(crate::Error::config("API key cannot be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("Request timeout must be > 0"));
        }
        validate_url("base_url", &self.base_url)?;
        validate_url("clusters_url", &self.clusters_url)?;
        Ok(())
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .field("clusters_url", &self.clusters_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn validate_url(name: &str, raw: &str) -> Result<(), crate::Error> {
    let url = url::Url::parse(raw)
        .map_err(|e| crate::Error::config(format!("invalid {name} {raw:?}: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(crate::Error::config(format!(
            "{name} must use http or https, got {raw:?}"
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(crate::Error::config(format!(
            "{name} must name a host, got {raw:?}"
        )));
    }
    Ok(())
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_clusters_url() -> String {
    DEFAULT_CLUSTERS_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
