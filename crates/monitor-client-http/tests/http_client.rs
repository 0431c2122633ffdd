//! Integration tests for the HTTP monitor client using wiremock.
//!
//! These tests verify request shapes, headers and status handling against a
//! mock configuration service.

use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use monitor_client_http::HttpMonitorClient;
use monitor_core::config::ClientConfig;
use monitor_core::error::{ClientError, Operation};
use monitor_core::model::MonitorSpec;
use monitor_core::MonitorClient;

const TOKEN: &str = "123e4567-e89b-12d3-a456-426614174000";
const CONFIG_PATH: &str = "/api/v2/realtime-monitors/config";
const CLUSTERS_PATH: &str = "/api/v2/clusters";

// =============================================================================
// Test Helpers
// =============================================================================

fn create_client(server: &MockServer) -> HttpMonitorClient {
    let config = ClientConfig::new("test-api-key")
        .with_base_url(format!("{}{}", server.uri(), CONFIG_PATH))
        .with_clusters_url(format!("{}{}", server.uri(), CLUSTERS_PATH))
        .with_timeout_secs(1);
    HttpMonitorClient::new(config).unwrap()
}

fn monitor_body() -> serde_json::Value {
    json!({
        "id": TOKEN,
        "createdAt": "2025-01-09T12:00:00Z",
        "updatedAt": "2025-01-09T12:00:00Z",
        "isDeleted": false,
        "name": "payments-latency",
        "sensors": [{"cluster": "prod-east"}],
        "sinks": {"slack": ["#payments-alerts"]},
        "active": true,
        "type": "availability",
        "variables": {"duration": 30},
        "sinksOptions": {"notifyOn": ["Failure"]}
    })
}

fn spec() -> MonitorSpec {
    serde_json::from_value(json!({
        "name": "payments-latency",
        "sensors": [{"cluster": "prod-east"}],
        "sinks": {"slack": ["#payments-alerts"]},
        "active": true,
        "type": "availability",
        "variables": {"duration": 30},
        "sinksOptions": {"notifyOn": ["Failure"]}
    }))
    .unwrap()
}

// =============================================================================
// Get
// =============================================================================

#[tokio::test]
async fn get_sends_api_key_and_json_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{}/{}", CONFIG_PATH, TOKEN)))
        .and(header("X-API-KEY", "test-api-key"))
        .and(header("Accept", "application/json"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(monitor_body()))
        .expect(1)
        .mount(&server)
        .await;

    let monitor = create_client(&server).get_monitor(TOKEN).await.unwrap();

    assert_eq!(monitor.id, TOKEN);
    assert_eq!(monitor.spec.name, "payments-latency");
    assert_eq!(monitor.spec.sensors.len(), 1);
    assert!(!monitor.is_deleted);
}

#[tokio::test]
async fn get_404_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{}/{}", CONFIG_PATH, TOKEN)))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = create_client(&server).get_monitor(TOKEN).await.unwrap_err();
    assert_eq!(err, ClientError::not_found(TOKEN));
}

#[tokio::test]
async fn get_403_keeps_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{}/my-resource", CONFIG_PATH)))
        .respond_with(ResponseTemplate::new(403).set_body_string("invalid id"))
        .mount(&server)
        .await;

    let err = create_client(&server)
        .get_monitor("my-resource")
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ClientError::status(Operation::GetMonitor, 403, "invalid id")
    );
}

#[tokio::test]
async fn error_bodies_are_truncated() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{}/{}", CONFIG_PATH, TOKEN)))
        .respond_with(ResponseTemplate::new(500).set_body_string("x".repeat(1000)))
        .mount(&server)
        .await;

    let err = create_client(&server).get_monitor(TOKEN).await.unwrap_err();

    match err {
        ClientError::UnexpectedStatus { status, body, .. } => {
            assert_eq!(status, 500);
            assert_eq!(body.len(), 203);
        }
        other => panic!("expected unexpected status, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{}/{}", CONFIG_PATH, TOKEN)))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let err = create_client(&server).get_monitor(TOKEN).await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::InvalidResponse {
            operation: Operation::GetMonitor,
            ..
        }
    ));
}

#[tokio::test]
async fn timeout_is_transport_error_not_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{}/{}", CONFIG_PATH, TOKEN)))
        .respond_with(
            ResponseTemplate::new(404).set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let err = create_client(&server).get_monitor(TOKEN).await.unwrap_err();
    assert!(matches!(err, ClientError::Transport { .. }), "got {err:?}");
}

// =============================================================================
// List
// =============================================================================

#[tokio::test]
async fn list_accepts_bare_array() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CONFIG_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([monitor_body()])))
        .mount(&server)
        .await;

    let monitors = create_client(&server).list_monitors().await.unwrap();
    assert_eq!(monitors.len(), 1);
}

#[tokio::test]
async fn list_accepts_data_wrapper() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CONFIG_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": [monitor_body(), monitor_body()]})),
        )
        .mount(&server)
        .await;

    let monitors = create_client(&server).list_monitors().await.unwrap();
    assert_eq!(monitors.len(), 2);
}

#[tokio::test]
async fn list_rejects_non_200() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CONFIG_PATH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = create_client(&server).list_monitors().await.unwrap_err();
    assert_eq!(err.status_code(), Some(401));
}

// =============================================================================
// Create / Update / Delete
// =============================================================================

#[tokio::test]
async fn create_posts_full_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(CONFIG_PATH))
        .and(body_json(json!({
            "name": "payments-latency",
            "sensors": [{"cluster": "prod-east"}],
            "sinks": {"slack": ["#payments-alerts"]},
            "active": true,
            "type": "availability",
            "variables": {"duration": 30},
            "sinksOptions": {"notifyOn": ["Failure"]}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(monitor_body()))
        .expect(1)
        .mount(&server)
        .await;

    let created = create_client(&server).create_monitor(&spec()).await.unwrap();
    assert_eq!(created.id, TOKEN);
}

#[tokio::test]
async fn create_accepts_200() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(CONFIG_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(monitor_body()))
        .mount(&server)
        .await;

    assert!(create_client(&server).create_monitor(&spec()).await.is_ok());
}

#[tokio::test]
async fn create_rejects_other_statuses() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(CONFIG_PATH))
        .respond_with(ResponseTemplate::new(202).set_body_json(monitor_body()))
        .mount(&server)
        .await;

    let err = create_client(&server)
        .create_monitor(&spec())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(202));
}

#[tokio::test]
async fn update_patches_item() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path(format!("{}/{}", CONFIG_PATH, TOKEN)))
        .and(header("X-API-KEY", "test-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(monitor_body()))
        .expect(1)
        .mount(&server)
        .await;

    let updated = create_client(&server)
        .update_monitor(TOKEN, &spec())
        .await
        .unwrap();
    assert_eq!(updated.spec, spec());
}

#[tokio::test]
async fn delete_requires_204() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path(format!("{}/{}", CONFIG_PATH, TOKEN)))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("{}/other", CONFIG_PATH)))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = create_client(&server);
    assert!(client.delete_monitor(TOKEN).await.is_ok());

    let err = client.delete_monitor("other").await.unwrap_err();
    assert_eq!(
        err,
        ClientError::status(Operation::DeleteMonitor, 200, "")
    );
}

// =============================================================================
// Clusters
// =============================================================================

#[tokio::test]
async fn list_clusters_returns_names() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CLUSTERS_PATH))
        .and(header("X-API-KEY", "test-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "clusters": [
                    {"name": "prod-east", "provider": "aws"},
                    {"name": "prod-west", "provider": "gcp"}
                ]
            }
        })))
        .mount(&server)
        .await;

    let clusters = create_client(&server).list_clusters().await.unwrap();
    assert_eq!(clusters, vec!["prod-east", "prod-west"]);
}

#[tokio::test]
async fn list_clusters_rejects_non_200() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CLUSTERS_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = create_client(&server).list_clusters().await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::UnexpectedStatus {
            operation: Operation::ListClusters,
            status: 500,
            ..
        }
    ));
}
