//! Follow and block integration tests.

mod common;

use common::TestHarness;
use serde_json::json;

// ============================================================================
// Follow / unfollow
// ============================================================================

#[tokio::test]
async fn follow_then_unfollow_restores_counters() {
    let harness = TestHarness::new();
    let (_, alice) = harness.register("wx-a", "alice").await;
    let (bob_id, bob) = harness.register("wx-b", "bob").await;

    harness
        .server
        .post(&format!("/v1/relations/follow/{bob_id}"))
        .add_header("authorization", alice.clone())
        .json(&json!({}))
        .await
        .assert_status_ok();

    let response = harness
        .server
        .get("/v1/users/me")
        .add_header("authorization", bob.clone())
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["followers"], 1);

    let response = harness
        .server
        .get("/v1/users/me")
        .add_header("authorization", alice.clone())
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["following"], 1);

    harness
        .server
        .delete(&format!("/v1/relations/follow/{bob_id}"))
        .add_header("authorization", alice.clone())
        .await
        .assert_status_ok();

    let response = harness
        .server
        .get("/v1/users/me")
        .add_header("authorization", bob)
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["followers"], 0);

    let response = harness
        .server
        .get("/v1/users/me")
        .add_header("authorization", alice)
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["following"], 0);
}

#[tokio::test]
async fn repeated_follow_does_not_drift_counters() {
    let harness = TestHarness::new();
    let (_, alice) = harness.register("wx-a", "alice").await;
    let (bob_id, bob) = harness.register("wx-b", "bob").await;

    for _ in 0..3 {
        harness
            .server
            .post(&format!("/v1/relations/follow/{bob_id}"))
            .add_header("authorization", alice.clone())
            .json(&json!({}))
            .await
            .assert_status_ok();
    }

    let response = harness
        .server
        .get("/v1/users/me")
        .add_header("authorization", bob)
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["followers"], 1);
}

#[tokio::test]
async fn cannot_follow_yourself() {
    let harness = TestHarness::new();
    let (alice_id, alice) = harness.register("wx-a", "alice").await;

    let response = harness
        .server
        .post(&format!("/v1/relations/follow/{alice_id}"))
        .add_header("authorization", alice)
        .json(&json!({}))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn cannot_follow_missing_user() {
    let harness = TestHarness::new();
    let (_, alice) = harness.register("wx-a", "alice").await;

    let response = harness
        .server
        .post("/v1/relations/follow/00000000-0000-4000-8000-000000000000")
        .add_header("authorization", alice)
        .json(&json!({}))
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn follower_listings() {
    let harness = TestHarness::new();
    let (_, alice) = harness.register("wx-a", "alice").await;
    let (_, bob) = harness.register("wx-b", "bob").await;
    let (carol_id, carol) = harness.register("wx-c", "carol").await;

    for auth in [&alice, &bob] {
        harness
            .server
            .post(&format!("/v1/relations/follow/{carol_id}"))
            .add_header("authorization", auth.clone())
            .json(&json!({}))
            .await
            .assert_status_ok();
    }

    let response = harness
        .server
        .get("/v1/relations/followers")
        .add_header("authorization", carol)
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["total"], 2);

    let response = harness
        .server
        .get("/v1/relations/following")
        .add_header("authorization", alice)
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["total"], 1);
    assert_eq!(body["users"][0]["nickname"], "carol");
}

// ============================================================================
// Block
// ============================================================================

#[tokio::test]
async fn blocked_user_cannot_follow() {
    let harness = TestHarness::new();
    let (alice_id, alice) = harness.register("wx-a", "alice").await;
    let (bob_id, bob) = harness.register("wx-b", "bob").await;

    harness
        .server
        .post(&format!("/v1/relations/block/{bob_id}"))
        .add_header("authorization", alice)
        .json(&json!({}))
        .await
        .assert_status_ok();

    let response = harness
        .server
        .post(&format!("/v1/relations/follow/{alice_id}"))
        .add_header("authorization", bob)
        .json(&json!({}))
        .await;

    response.assert_status_forbidden();
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], 403);
}

#[tokio::test]
async fn blocking_severs_existing_follows() {
    let harness = TestHarness::new();
    let (alice_id, alice) = harness.register("wx-a", "alice").await;
    let (bob_id, bob) = harness.register("wx-b", "bob").await;

    harness
        .server
        .post(&format!("/v1/relations/follow/{bob_id}"))
        .add_header("authorization", alice.clone())
        .json(&json!({}))
        .await
        .assert_status_ok();
    harness
        .server
        .post(&format!("/v1/relations/follow/{alice_id}"))
        .add_header("authorization", bob.clone())
        .json(&json!({}))
        .await
        .assert_status_ok();

    harness
        .server
        .post(&format!("/v1/relations/block/{bob_id}"))
        .add_header("authorization", alice.clone())
        .json(&json!({}))
        .await
        .assert_status_ok();

    // Both follow edges and their counters are gone.
    for auth in [&alice, &bob] {
        let response = harness
            .server
            .get("/v1/users/me")
            .add_header("authorization", auth.clone())
            .await;
        let body: serde_json::Value = response.json();
        assert_eq!(body["followers"], 0);
        assert_eq!(body["following"], 0);
    }

    let response = harness
        .server
        .get("/v1/relations/blocked")
        .add_header("authorization", alice)
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["total"], 1);
    assert_eq!(body["users"][0]["nickname"], "bob");
}

#[tokio::test]
async fn unblock_allows_following_again() {
    let harness = TestHarness::new();
    let (alice_id, alice) = harness.register("wx-a", "alice").await;
    let (bob_id, bob) = harness.register("wx-b", "bob").await;

    harness
        .server
        .post(&format!("/v1/relations/block/{bob_id}"))
        .add_header("authorization", alice.clone())
        .json(&json!({}))
        .await
        .assert_status_ok();
    harness
        .server
        .delete(&format!("/v1/relations/block/{bob_id}"))
        .add_header("authorization", alice)
        .await
        .assert_status_ok();

    let response = harness
        .server
        .post(&format!("/v1/relations/follow/{alice_id}"))
        .add_header("authorization", bob)
        .json(&json!({}))
        .await;

    response.assert_status_ok();
}

#[tokio::test]
async fn cannot_block_yourself() {
    let harness = TestHarness::new();
    let (alice_id, alice) = harness.register("wx-a", "alice").await;

    let response = harness
        .server
        .post(&format!("/v1/relations/block/{alice_id}"))
        .add_header("authorization", alice)
        .json(&json!({}))
        .await;

    response.assert_status(axum::http::StatusCode::CONFLICT);
}
