//! Common test utilities for swimclub integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use serde_json::{json, Value};
use tempfile::TempDir;

use swimclub_service::{create_router, AppState, ServiceConfig};
use swimclub_store::RocksStore;

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Temporary directory for the database (kept alive for test duration).
    pub _temp_dir: TempDir,
}

impl TestHarness {
    /// Create a new test harness with a fresh database.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = RocksStore::open(temp_dir.path()).expect("Failed to open store");

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            data_dir: temp_dir.path().to_string_lossy().to_string(),
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        };

        let state = AppState::new(Arc::new(store), config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            _temp_dir: temp_dir,
        }
    }

    /// Register a user and return `(user id, auth header)`.
    pub async fn register(&self, open_id: &str, nickname: &str) -> (String, String) {
        self.register_with_body(json!({ "open_id": open_id, "nickname": nickname }))
            .await
    }

    /// Register a user with a home region.
    pub async fn register_in_city(
        &self,
        open_id: &str,
        nickname: &str,
        province: &str,
        city: &str,
    ) -> (String, String) {
        self.register_with_body(json!({
            "open_id": open_id,
            "nickname": nickname,
            "region": { "province": province, "city": city, "city_code": null }
        }))
        .await
    }

    async fn register_with_body(&self, body: Value) -> (String, String) {
        let response = self.server.post("/v1/users").json(&body).await;
        response.assert_status_ok();
        let user: Value = response.json();
        let id = user["id"].as_str().expect("user id in response").to_string();
        let header = format!("Bearer test-token:{id}");
        (id, header)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
