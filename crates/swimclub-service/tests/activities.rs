//! Activity recorder integration tests.

mod common;

use common::TestHarness;
use serde_json::json;

async fn record_swim(
    harness: &TestHarness,
    auth: &str,
    distance_m: i64,
    duration_min: i64,
    calories: i64,
) {
    harness
        .server
        .post("/v1/activities")
        .add_header("authorization", auth.to_string())
        .json(&json!({
            "distance_m": distance_m,
            "duration_min": duration_min,
            "calories": calories
        }))
        .await
        .assert_status_ok();
}

// ============================================================================
// Latest
// ============================================================================

#[tokio::test]
async fn latest_swim_is_the_most_recent_one() {
    let harness = TestHarness::new();
    let (_, auth) = harness.register("wx-1", "alice").await;

    record_swim(&harness, &auth, 600, 20, 150).await;
    record_swim(&harness, &auth, 900, 30, 220).await;

    let response = harness
        .server
        .get("/v1/activities/latest")
        .add_header("authorization", auth)
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["distance_m"], 900);
}

#[tokio::test]
async fn latest_without_any_swims_is_not_found() {
    let harness = TestHarness::new();
    let (_, auth) = harness.register("wx-1", "alice").await;

    let response = harness
        .server
        .get("/v1/activities/latest")
        .add_header("authorization", auth)
        .await;

    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}

// ============================================================================
// Windowed records
// ============================================================================

#[tokio::test]
async fn day_records_list_todays_swims_newest_first() {
    let harness = TestHarness::new();
    let (_, auth) = harness.register("wx-1", "alice").await;

    record_swim(&harness, &auth, 600, 20, 150).await;
    record_swim(&harness, &auth, 900, 30, 220).await;

    let response = harness
        .server
        .get("/v1/activities/records")
        .add_header("authorization", auth)
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["period"], "day");
    assert_eq!(body["total"], 2);
    let records = body["records"].as_array().unwrap();
    assert_eq!(records[0]["distance_m"], 900);
    assert_eq!(records[1]["distance_m"], 600);
}

#[tokio::test]
async fn every_window_covers_a_swim_recorded_now() {
    let harness = TestHarness::new();
    let (_, auth) = harness.register("wx-1", "alice").await;

    record_swim(&harness, &auth, 750, 25, 180).await;

    for period in ["day", "week", "month", "year", "total"] {
        let response = harness
            .server
            .get(&format!("/v1/activities/records?period={period}"))
            .add_header("authorization", auth.clone())
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["period"], period);
        assert_eq!(body["total"], 1, "period {period} missed the swim");
    }
}

#[tokio::test]
async fn unknown_period_is_rejected() {
    let harness = TestHarness::new();
    let (_, auth) = harness.register("wx-1", "alice").await;

    let response = harness
        .server
        .get("/v1/activities/records?period=decade")
        .add_header("authorization", auth)
        .await;

    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

// ============================================================================
// Windowed stats
// ============================================================================

#[tokio::test]
async fn stats_aggregate_distance_duration_and_calories() {
    let harness = TestHarness::new();
    let (_, auth) = harness.register("wx-1", "alice").await;

    record_swim(&harness, &auth, 1000, 30, 200).await;
    record_swim(&harness, &auth, 500, 15, 100).await;

    let response = harness
        .server
        .get("/v1/activities/stats")
        .add_header("authorization", auth)
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["period"], "total");
    assert_eq!(body["total_distance_m"], 1500);
    assert_eq!(body["total_duration_min"], 45);
    assert_eq!(body["total_calories"], 300);
    assert_eq!(body["activity_count"], 2);
}

#[tokio::test]
async fn stats_for_a_new_user_are_zero() {
    let harness = TestHarness::new();
    let (_, auth) = harness.register("wx-1", "alice").await;

    let response = harness
        .server
        .get("/v1/activities/stats?period=week")
        .add_header("authorization", auth)
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["period"], "week");
    assert_eq!(body["total_distance_m"], 0);
    assert_eq!(body["activity_count"], 0);
}
