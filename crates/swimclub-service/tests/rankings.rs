//! Leaderboard integration tests.

mod common;

use common::TestHarness;
use serde_json::json;

// ============================================================================
// Recording swims
// ============================================================================

#[tokio::test]
async fn recorded_swim_appears_in_rankings() {
    let harness = TestHarness::new();
    let (user_id, auth) = harness.register("wx-1", "alice").await;

    harness
        .server
        .post("/v1/activities")
        .add_header("authorization", auth.clone())
        .json(&json!({ "distance_m": 750 }))
        .await
        .assert_status_ok();

    let response = harness
        .server
        .get("/v1/rankings?type=total")
        .add_header("authorization", auth)
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let rankings = body["rankings"].as_array().unwrap();
    assert_eq!(rankings.len(), 1);
    assert_eq!(rankings[0]["rank"], 1);
    assert_eq!(rankings[0]["total_distance"], 750);
    assert_eq!(rankings[0]["activity_count"], 1);
    assert_eq!(rankings[0]["user"]["id"], user_id.as_str());
}

#[tokio::test]
async fn swim_updates_every_dimension() {
    let harness = TestHarness::new();
    let (_, auth) = harness.register("wx-1", "alice").await;

    harness
        .server
        .post("/v1/activities")
        .add_header("authorization", auth.clone())
        .json(&json!({ "distance_m": 300 }))
        .await
        .assert_status_ok();

    for dimension in ["daily", "weekly", "monthly", "yearly", "total"] {
        let response = harness
            .server
            .get(&format!("/v1/rankings/me?type={dimension}"))
            .add_header("authorization", auth.clone())
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["total_distance"], 300, "dimension {dimension}");
        assert_eq!(body["rank"], 1, "dimension {dimension}");
    }
}

#[tokio::test]
async fn rankings_ordered_by_distance() {
    let harness = TestHarness::new();
    let (_, alice) = harness.register("wx-a", "alice").await;
    let (_, bob) = harness.register("wx-b", "bob").await;
    let (_, carol) = harness.register("wx-c", "carol").await;

    for (auth, distance) in [(&alice, 100), (&bob, 300), (&carol, 200)] {
        harness
            .server
            .post("/v1/activities")
            .add_header("authorization", auth.clone())
            .json(&json!({ "distance_m": distance }))
            .await
            .assert_status_ok();
    }

    let response = harness
        .server
        .get("/v1/rankings?type=total")
        .add_header("authorization", alice)
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let rankings = body["rankings"].as_array().unwrap();
    assert_eq!(rankings.len(), 3);
    assert_eq!(rankings[0]["user"]["nickname"], "bob");
    assert_eq!(rankings[1]["user"]["nickname"], "carol");
    assert_eq!(rankings[2]["user"]["nickname"], "alice");
    assert_eq!(rankings[0]["rank"], 1);
    assert_eq!(rankings[1]["rank"], 2);
    assert_eq!(rankings[2]["rank"], 3);
}

#[tokio::test]
async fn rankings_annotate_follow_state() {
    let harness = TestHarness::new();
    let (_, alice) = harness.register("wx-a", "alice").await;
    let (bob_id, bob) = harness.register("wx-b", "bob").await;

    for auth in [&alice, &bob] {
        harness
            .server
            .post("/v1/activities")
            .add_header("authorization", auth.clone())
            .json(&json!({ "distance_m": 500 }))
            .await
            .assert_status_ok();
    }

    harness
        .server
        .post(&format!("/v1/relations/follow/{bob_id}"))
        .add_header("authorization", alice.clone())
        .json(&json!({}))
        .await
        .assert_status_ok();

    let response = harness
        .server
        .get("/v1/rankings?type=total")
        .add_header("authorization", alice)
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    for row in body["rankings"].as_array().unwrap() {
        let expected = row["user"]["nickname"] == "bob";
        assert_eq!(row["is_following"], expected);
    }
}

// ============================================================================
// My ranking
// ============================================================================

#[tokio::test]
async fn my_ranking_defaults_to_zero() {
    let harness = TestHarness::new();
    let (_, auth) = harness.register("wx-1", "alice").await;

    let response = harness
        .server
        .get("/v1/rankings/me?type=weekly")
        .add_header("authorization", auth)
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["rank"], 0);
    assert_eq!(body["total_distance"], 0);
    assert_eq!(body["activity_count"], 0);
}

// ============================================================================
// Sync
// ============================================================================

#[tokio::test]
async fn sync_single_dimension() {
    let harness = TestHarness::new();
    let (_, auth) = harness.register("wx-1", "alice").await;

    let response = harness
        .server
        .post("/v1/rankings/sync")
        .add_header("authorization", auth.clone())
        .json(&json!({ "distance": 1200, "type": "weekly" }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["ranking"]["rank"], 1);
    assert_eq!(body["ranking"]["total_distance"], 1200);

    // Only the requested dimension moved.
    let response = harness
        .server
        .get("/v1/rankings/me?type=total")
        .add_header("authorization", auth)
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["total_distance"], 0);
}

#[tokio::test]
async fn sync_rejects_non_positive_distance() {
    let harness = TestHarness::new();
    let (_, auth) = harness.register("wx-1", "alice").await;

    let response = harness
        .server
        .post("/v1/rankings/sync")
        .add_header("authorization", auth)
        .json(&json!({ "distance": 0 }))
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], 400);
}

// ============================================================================
// Regional rankings
// ============================================================================

#[tokio::test]
async fn regional_rankings_normalize_city_names() {
    let harness = TestHarness::new();
    let (_, beijing) = harness
        .register_in_city("wx-bj", "beijinger", "北京", "北京市")
        .await;
    let (_, shanghai) = harness
        .register_in_city("wx-sh", "shanghaier", "上海", "上海市")
        .await;

    for auth in [&beijing, &shanghai] {
        harness
            .server
            .post("/v1/activities")
            .add_header("authorization", auth.clone())
            .json(&json!({ "distance_m": 400 }))
            .await
            .assert_status_ok();
    }

    // A bare "北京" query matches the stored "北京市".
    let response = harness
        .server
        .get("/v1/rankings/region?type=total&city=%E5%8C%97%E4%BA%AC")
        .add_header("authorization", beijing)
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let rankings = body["rankings"].as_array().unwrap();
    assert_eq!(rankings.len(), 1);
    assert_eq!(rankings[0]["user"]["nickname"], "beijinger");
}

#[tokio::test]
async fn regional_rankings_require_city() {
    let harness = TestHarness::new();
    let (_, auth) = harness.register("wx-1", "alice").await;

    let response = harness
        .server
        .get("/v1/rankings/region?type=total&city=")
        .add_header("authorization", auth)
        .await;

    response.assert_status_bad_request();
}
