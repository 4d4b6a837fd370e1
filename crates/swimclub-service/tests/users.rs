//! User registration and profile integration tests.

mod common;

use common::TestHarness;
use serde_json::json;

#[tokio::test]
async fn registration_returns_a_profile() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/users")
        .json(&json!({ "open_id": "wx-1", "nickname": "alice" }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["nickname"], "alice");
    assert_eq!(body["followers"], 0);
    assert_eq!(body["following"], 0);
    assert_eq!(body["points"], 0);
}

#[tokio::test]
async fn re_registration_keeps_the_user_id() {
    let harness = TestHarness::new();
    let (id, _) = harness.register("wx-1", "alice").await;

    let response = harness
        .server
        .post("/v1/users")
        .json(&json!({ "open_id": "wx-1", "nickname": "alice renamed" }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["id"], id.as_str());
    assert_eq!(body["nickname"], "alice renamed");
}

#[tokio::test]
async fn registration_requires_open_id() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/users")
        .json(&json!({ "open_id": "", "nickname": "alice" }))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn profiles_are_readable_by_other_users() {
    let harness = TestHarness::new();
    let (alice_id, _) = harness.register("wx-a", "alice").await;
    let (_, bob) = harness.register("wx-b", "bob").await;

    let response = harness
        .server
        .get(&format!("/v1/users/{alice_id}"))
        .add_header("authorization", bob)
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["nickname"], "alice");
}

#[tokio::test]
async fn missing_profile_is_not_found() {
    let harness = TestHarness::new();
    let (_, auth) = harness.register("wx-1", "alice").await;

    let response = harness
        .server
        .get("/v1/users/00000000-0000-4000-8000-000000000000")
        .add_header("authorization", auth)
        .await;

    response.assert_status_not_found();
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], 404);
    assert!(body["data"].is_null());
}
