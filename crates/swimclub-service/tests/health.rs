//! Health check integration tests.

mod common;

use common::TestHarness;

#[tokio::test]
async fn health_check() {
    let harness = TestHarness::new();

    let response = harness.server.get("/health").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "swimclub-service");
}

#[tokio::test]
async fn unauthenticated_request_rejected() {
    let harness = TestHarness::new();

    let response = harness.server.get("/v1/points").await;

    response.assert_status_unauthorized();
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], 401);
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn malformed_token_rejected() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .get("/v1/points")
        .add_header("authorization", "Bearer test-token:not-a-uuid")
        .await;

    response.assert_status_unauthorized();
}
