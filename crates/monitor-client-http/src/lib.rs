// # HTTP Monitor Client
//
// `MonitorClient` implementation for the hosted real-time monitor
// configuration service and its cluster directory.
//
// ## Behavior
//
// - One HTTP request per trait call; no retries, no caching, no background tasks
// - Per-request timeout from `ClientConfig::timeout_secs` (default 10 seconds)
// - Every request carries `X-API-KEY` and JSON content negotiation headers
// - Status handling:
//   - list/get/update: 200
//   - create: 200 or 201
//   - delete: 204 only
//   - get: 404 → `ClientError::NotFound`
//   - anything else → `ClientError::UnexpectedStatus` with a truncated body
//
// ## Security Requirements
//
// - The API key NEVER appears in logs or `Debug` output
// - Construction fails fast on an empty key
//
// ## API Reference
//
// - List monitors: GET `{base_url}` → `[Monitor]` or `{"data": [Monitor]}`
// - Get monitor: GET `{base_url}/{id}`
// - Create monitor: POST `{base_url}`
// - Update monitor: PATCH `{base_url}/{id}`
// - Delete monitor: DELETE `{base_url}/{id}`
// - List clusters: GET `{clusters_url}` → `{"data": {"clusters": [{"name": ...}]}}`

use async_trait::async_trait;
use monitor_core::config::ClientConfig;
use monitor_core::error::{ClientError, Operation};
use monitor_core::model::{Monitor, MonitorSpec};
use monitor_core::{Error, MonitorClient, Result};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Header carrying the API key
const API_KEY_HEADER: &str = "X-API-KEY";

/// Maximum number of body characters kept in an error
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Monitor client backed by `reqwest`
///
/// Stateless apart from the connection pool; safe to share across tasks.
pub struct HttpMonitorClient {
    /// ⚠️ NEVER log this value
    api_key: String,

    /// Monitor collection URL, without trailing slash
    base_url: String,

    /// Cluster directory URL
    clusters_url: String,

    client: reqwest::Client,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for HttpMonitorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpMonitorClient")
            .field("api_key", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .field("clusters_url", &self.clusters_url)
            .finish()
    }
}

/// List response: either a bare array or wrapped in `data`
#[derive(Deserialize)]
#[serde(untagged)]
enum MonitorList {
    Bare(Vec<Monitor>),
    Wrapped { data: Vec<Monitor> },
}

impl MonitorList {
    fn into_monitors(self) -> Vec<Monitor> {
        match self {
            MonitorList::Bare(monitors) | MonitorList::Wrapped { data: monitors } => monitors,
        }
    }
}

#[derive(Deserialize)]
struct ClusterList {
    data: ClusterData,
}

#[derive(Deserialize)]
struct ClusterData {
    #[serde(default)]
    clusters: Vec<ClusterEntry>,
}

#[derive(Deserialize)]
struct ClusterEntry {
    name: String,
}

impl HttpMonitorClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the configuration is invalid or the HTTP
    /// client cannot be built.
    ///
    /// # Security
    ///
    /// The API key will NEVER be logged or displayed in error messages.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key: config.api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            clusters_url: config.clusters_url,
            client,
        })
    }

    fn item_url(&self, id: &str) -> String {
        format!("{}/{}", self.base_url, id)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
    }

    async fn send(
        &self,
        operation: Operation,
        request: RequestBuilder,
    ) -> std::result::Result<Response, ClientError> {
        request.send().await.map_err(|e| {
            let message = if e.is_timeout() {
                format!("request timed out: {}", e)
            } else {
                format!("HTTP request failed: {}", e)
            };
            ClientError::transport(operation, message)
        })
    }
}

/// Turn a response with an unexpected status into an error, keeping a short body
async fn unexpected_status(operation: Operation, response: Response) -> ClientError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read error response".to_string());
    tracing::debug!("{} returned status {}", operation, status);
    ClientError::status(operation, status, truncate(&body))
}

async fn read_json<T: DeserializeOwned>(
    operation: Operation,
    response: Response,
) -> std::result::Result<T, ClientError> {
    let body = response.text().await.map_err(|e| {
        ClientError::transport(operation, format!("Failed to read response body: {}", e))
    })?;
    serde_json::from_str(&body).map_err(|e| {
        ClientError::invalid_response(operation, format!("Failed to parse response: {}", e))
    })
}

fn truncate(body: &str) -> String {
    if body.chars().count() <= MAX_ERROR_BODY_CHARS {
        return body.to_string();
    }
    let mut short: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
    short.push_str("...");
    short
}

#[async_trait]
impl MonitorClient for HttpMonitorClient {
    async fn list_monitors(&self) -> std::result::Result<Vec<Monitor>, ClientError> {
        let operation = Operation::ListMonitors;
        tracing::debug!("Listing monitors");

        let response = self
            .send(operation, self.request(Method::GET, &self.base_url))
            .await?;
        if response.status() != StatusCode::OK {
            return Err(unexpected_status(operation, response).await);
        }

        let monitors = read_json::<MonitorList>(operation, response)
            .await?
            .into_monitors();
        tracing::debug!("Listed {} monitors", monitors.len());
        Ok(monitors)
    }

    async fn get_monitor(&self, id: &str) -> std::result::Result<Monitor, ClientError> {
        let operation = Operation::GetMonitor;
        tracing::debug!("Fetching monitor {}", id);

        let response = self
            .send(operation, self.request(Method::GET, &self.item_url(id)))
            .await?;
        match response.status() {
            StatusCode::OK => read_json(operation, response).await,
            StatusCode::NOT_FOUND => Err(ClientError::not_found(id)),
            _ => Err(unexpected_status(operation, response).await),
        }
    }

    async fn create_monitor(&self, spec: &MonitorSpec) -> std::result::Result<Monitor, ClientError> {
        let operation = Operation::CreateMonitor;
        tracing::debug!("Creating monitor {}", spec.name);

        let response = self
            .send(
                operation,
                self.request(Method::POST, &self.base_url).json(spec),
            )
            .await?;
        match response.status() {
            StatusCode::OK | StatusCode::CREATED => read_json(operation, response).await,
            _ => Err(unexpected_status(operation, response).await),
        }
    }

    async fn update_monitor(
        &self,
        id: &str,
        spec: &MonitorSpec,
    ) -> std::result::Result<Monitor, ClientError> {
        let operation = Operation::UpdateMonitor;
        tracing::debug!("Updating monitor {} ({})", spec.name, id);

        let response = self
            .send(
                operation,
                self.request(Method::PATCH, &self.item_url(id)).json(spec),
            )
            .await?;
        match response.status() {
            StatusCode::OK => read_json(operation, response).await,
            _ => Err(unexpected_status(operation, response).await),
        }
    }

    async fn delete_monitor(&self, id: &str) -> std::result::Result<(), ClientError> {
        let operation = Operation::DeleteMonitor;
        tracing::debug!("Deleting monitor {}", id);

        let response = self
            .send(operation, self.request(Method::DELETE, &self.item_url(id)))
            .await?;
        match response.status() {
            StatusCode::NO_CONTENT => Ok(()),
            _ => Err(unexpected_status(operation, response).await),
        }
    }

    async fn list_clusters(&self) -> std::result::Result<Vec<String>, ClientError> {
        let operation = Operation::ListClusters;
        tracing::debug!("Listing clusters");

        let response = self
            .send(operation, self.request(Method::GET, &self.clusters_url))
            .await?;
        if response.status() != StatusCode::OK {
            return Err(unexpected_status(operation, response).await);
        }

        let clusters: ClusterList = read_json(operation, response).await?;
        Ok(clusters
            .data
            .clusters
            .into_iter()
            .map(|cluster| cluster.name)
            .collect())
    }

    fn client_name(&self) -> &'static str {
        "http"
    }
}
