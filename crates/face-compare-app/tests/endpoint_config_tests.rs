//! Integration tests for endpoint configuration and health probing.

mod common;

use std::sync::Arc;

use common::{RecordingTransport, StubServer, fixture_source};
use face_compare_app::{AppConfig, AppError, Workflow};
use face_compare_client::{ClientError, UreqTransport};

#[test]
fn endpoint_config_tests_rejects_unsupported_scheme() {
    let (events_tx, _events_rx) = std::sync::mpsc::channel();
    let config = AppConfig {
        compare_endpoint: "ftp://faces.example.test/api/compare".to_string(),
        ..AppConfig::default()
    };

    let result = Workflow::new(
        &config,
        RecordingTransport::answering(200, "{}"),
        fixture_source(),
        events_tx,
    );
    assert!(matches!(
        result,
        Err(AppError::Client(ClientError::InvalidEndpoint(_)))
    ));
}

#[test]
fn endpoint_config_tests_health_probe_reads_stub() {
    let server = StubServer::spawn(
        200,
        r#"{"status":"healthy","model_loaded":true,"model_type":"RandomForest","scaler_type":"StandardScaler"}"#,
    );
    let (events_tx, _events_rx) = std::sync::mpsc::channel();
    let config = AppConfig {
        health_endpoint: format!("{}/api/health", server.base_url),
        ..AppConfig::default()
    };
    let workflow = Workflow::new(
        &config,
        Arc::new(UreqTransport::new()),
        fixture_source(),
        events_tx,
    )
    .expect("workflow should build");

    let health = workflow.health().expect("health should parse");
    assert!(health.is_ready());
    assert_eq!(health.model_type.as_deref(), Some("RandomForest"));

    let request = String::from_utf8_lossy(&server.request()).into_owned();
    assert!(request.starts_with("GET /api/health HTTP/1.1"));
}
