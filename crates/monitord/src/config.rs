// # Daemon Configuration
//
// All configuration is read from environment variables:
//
// ### Service
// - `MONITOR_API_KEY`: API key for the configuration service (required)
// - `MONITOR_API_URL`: Monitor collection URL
// - `MONITOR_CLUSTERS_URL`: Cluster directory URL
// - `MONITOR_HTTP_TIMEOUT_SECS`: Per-request timeout
//
// ### Files
// - `MONITOR_SPEC_PATH`: Desired-state file (required)
// - `MONITOR_STATE_PATH`: State file (default: monitord-state.json)
//
// ### Loop
// - `MONITOR_POLL_INTERVAL_SECS`: Seconds between cycles (default: 60)
// - `MONITOR_LOG_LEVEL`: trace, debug, info, warn, error (default: info)

use anyhow::{Context, Result};
use monitor_core::ClientConfig;
use monitor_core::config::{DEFAULT_BASE_URL, DEFAULT_CLUSTERS_URL, DEFAULT_TIMEOUT_SECS};
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_STATE_PATH: &str = "monitord-state.json";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

/// Daemon configuration
#[derive(Debug)]
pub struct Config {
    pub api_key: String,
    pub api_url: String,
    pub clusters_url: String,
    pub http_timeout_secs: u64,
    pub spec_path: PathBuf,
    pub state_path: PathBuf,
    pub poll_interval_secs: u64,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            api_key: lookup("MONITOR_API_KEY").context(
                "MONITOR_API_KEY is required. Set it via: export MONITOR_API_KEY=your_key",
            )?,
            api_url: lookup("MONITOR_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            clusters_url: lookup("MONITOR_CLUSTERS_URL")
                .unwrap_or_else(|| DEFAULT_CLUSTERS_URL.to_string()),
            http_timeout_secs: parse_or(
                "MONITOR_HTTP_TIMEOUT_SECS",
                lookup("MONITOR_HTTP_TIMEOUT_SECS"),
                DEFAULT_TIMEOUT_SECS,
            )?,
            spec_path: lookup("MONITOR_SPEC_PATH")
                .map(PathBuf::from)
                .context(
                    "MONITOR_SPEC_PATH is required. \
                    Set it via: export MONITOR_SPEC_PATH=/etc/monitord/monitors.json",
                )?,
            state_path: lookup("MONITOR_STATE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_PATH)),
            poll_interval_secs: parse_or(
                "MONITOR_POLL_INTERVAL_SECS",
                lookup("MONITOR_POLL_INTERVAL_SECS"),
                DEFAULT_POLL_INTERVAL_SECS,
            )?,
            log_level: lookup("MONITOR_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let key_lower = self.api_key.to_lowercase();
        if key_lower.contains("your_key")
            || key_lower.contains("replace_me")
            || key_lower == "changeme"
        {
            anyhow::bail!(
                "MONITOR_API_KEY appears to be a placeholder. \
                Use an actual API key from the monitoring service."
            );
        }

        if !self.spec_path.is_file() {
            anyhow::bail!(
                "MONITOR_SPEC_PATH does not point to a file: {}",
                self.spec_path.display()
            );
        }

        if let Some(parent) = self.state_path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            anyhow::bail!(
                "MONITOR_STATE_PATH parent directory does not exist: {}. \
                Create it first: mkdir -p {}",
                parent.display(),
                parent.display()
            );
        }

        if !(5..=3600).contains(&self.poll_interval_secs) {
            anyhow::bail!(
                "MONITOR_POLL_INTERVAL_SECS must be between 5 and 3600 seconds. Got: {}",
                self.poll_interval_secs
            );
        }

        if !(1..=300).contains(&self.http_timeout_secs) {
            anyhow::bail!(
                "MONITOR_HTTP_TIMEOUT_SECS must be between 1 and 300 seconds. Got: {}",
                self.http_timeout_secs
            );
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "MONITOR_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        self.client_config().validate()?;

        Ok(())
    }

    /// Connection settings for the service client
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.api_key.clone())
            .with_base_url(self.api_url.clone())
            .with_clusters_url(self.clusters_url.clone())
            .with_timeout_secs(self.http_timeout_secs)
    }
}

fn parse_or<T>(name: &str, value: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a number. Got: {:?}", name, raw)),
        None => Ok(default),
    }
}
