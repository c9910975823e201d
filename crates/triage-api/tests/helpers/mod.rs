//! Test helpers: build the router over an in-memory gateway.
//!
//! No datastore or Docker needed: `cargo test -p triage-api`.

#![allow(dead_code)]

use axum_test::TestServer;
use std::sync::Arc;
use triage_api::constants;
use triage_api::setup::routes;
use triage_api::state::AppState;
use triage_core::{BaseConfig, Config, GatewayBackend, TriageConfig, DEFAULT_OVERDUE_LABEL};
use triage_db::test_helpers::InMemoryGateway;
use triage_db::InspectionRepository;

/// API path prefix for tests (e.g. `/api/v0`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server plus a handle on the gateway behind it.
pub struct TestApp {
    pub server: TestServer,
    pub gateway: InMemoryGateway,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub fn create_test_config() -> Config {
    Config(Box::new(TriageConfig {
        base: BaseConfig {
            server_port: 0,
            cors_origins: vec!["*".to_string()],
            environment: "test".to_string(),
        },
        gateway_backend: GatewayBackend::Rest,
        database_url: None,
        db_max_connections: 5,
        db_timeout_seconds: 5,
        datastore_url: Some("http://localhost:54321".to_string()),
        datastore_api_key: Some("test-key".to_string()),
        sla_overdue_label: DEFAULT_OVERDUE_LABEL.to_string(),
    }))
}

pub fn setup_test_app(gateway: InMemoryGateway) -> TestApp {
    let config = create_test_config();
    let repository = InspectionRepository::new(Arc::new(gateway.clone()));
    let state = Arc::new(AppState::new(repository, config.clone()));

    let router = routes::setup_routes(&config, state).expect("Failed to build routes");
    let server = TestServer::new(router).expect("Failed to start test server");

    TestApp { server, gateway }
}
