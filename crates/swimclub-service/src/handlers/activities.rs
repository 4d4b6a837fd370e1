//! Swim activity handlers.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use swimclub_core::{ActivityRecord, ActivityStats, StatsPeriod, TaskType};
use swimclub_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::leaderboard;
use crate::state::AppState;

/// Activity recording request.
#[derive(Debug, Deserialize)]
pub struct RecordActivityRequest {
    /// Distance swum, in meters.
    pub distance_m: i64,
    /// Duration in minutes.
    #[serde(default)]
    pub duration_min: i64,
    /// Calories burned.
    #[serde(default)]
    pub calories: i64,
    /// Pool length in meters, if swum in a pool.
    #[serde(default)]
    pub pool_length_m: Option<i64>,
}

/// Activity representation in responses.
#[derive(Debug, Serialize)]
pub struct ActivityResponse {
    /// Record ID.
    pub id: String,
    /// Distance swum, in meters.
    pub distance_m: i64,
    /// Duration in minutes.
    pub duration_min: i64,
    /// Calories burned.
    pub calories: i64,
    /// Pool length in meters, if swum in a pool.
    pub pool_length_m: Option<i64>,
    /// Recording timestamp.
    pub recorded_at: String,
}

impl From<&ActivityRecord> for ActivityResponse {
    fn from(record: &ActivityRecord) -> Self {
        Self {
            id: record.id.to_string(),
            distance_m: record.distance_m,
            duration_min: record.duration_min,
            calories: record.calories,
            pool_length_m: record.pool_length_m,
            recorded_at: record.recorded_at.to_rfc3339(),
        }
    }
}

/// Activity recording response.
#[derive(Debug, Serialize)]
pub struct RecordActivityResponse {
    /// The stored record.
    pub activity: ActivityResponse,
    /// Distance milestones completed by this swim.
    pub tasks_completed: Vec<TaskType>,
    /// Points those milestones awarded.
    pub points_awarded: i64,
}

/// Record a swim.
///
/// The distance fans out into every ranking dimension, ranks are
/// recomputed, and any same-day distance milestones award their points.
pub async fn record_activity(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(request): Json<RecordActivityRequest>,
) -> Result<Json<RecordActivityResponse>, ApiError> {
    if request.distance_m <= 0 {
        return Err(ApiError::BadRequest("distance must be positive".into()));
    }

    let user = state
        .store
        .get_user(&auth.user_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let mut record = ActivityRecord::new(user.id, user.open_id.clone(), request.distance_m);
    record.duration_min = request.duration_min;
    record.calories = request.calories;
    record.pool_length_m = request.pool_length_m;
    state.store.put_activity(&record)?;

    leaderboard::apply_swim_distance(
        &state.store,
        &auth.user_id,
        request.distance_m,
        Some(&user.region),
    )?;

    let (tasks_completed, points_awarded) =
        leaderboard::award_distance_milestones(&state.store, &auth.user_id, record.recorded_at)?;

    Ok(Json(RecordActivityResponse {
        activity: ActivityResponse::from(&record),
        tasks_completed,
        points_awarded,
    }))
}

/// Get the current user's most recent swim.
pub async fn latest_activity(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<ActivityResponse>, ApiError> {
    let record = state
        .store
        .latest_activity(&auth.user_id)?
        .ok_or_else(|| ApiError::NotFound("No activity recorded".into()))?;

    Ok(Json(ActivityResponse::from(&record)))
}

/// Reporting-window selector.
#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    /// Window to read; each handler has its own default.
    pub period: Option<StatsPeriod>,
}

/// Windowed record listing response.
#[derive(Debug, Serialize)]
pub struct PeriodRecordsResponse {
    /// The window the records were read from.
    pub period: StatsPeriod,
    /// Records in the window, newest first.
    pub records: Vec<ActivityResponse>,
    /// Number of records in the window.
    pub total: usize,
}

/// List the current user's swims within a reporting window, newest first.
///
/// Defaults to today's records.
pub async fn list_records(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<PeriodRecordsResponse>, ApiError> {
    let period = query.period.unwrap_or(StatsPeriod::Day);
    let mut records = state
        .store
        .list_activities_since(&auth.user_id, period.start(Utc::now()))?;
    records.reverse();

    Ok(Json(PeriodRecordsResponse {
        period,
        total: records.len(),
        records: records.iter().map(ActivityResponse::from).collect(),
    }))
}

/// Windowed stats response.
#[derive(Debug, Serialize)]
pub struct PeriodStatsResponse {
    /// The window the stats cover.
    pub period: StatsPeriod,
    /// Aggregated totals over the window.
    #[serde(flatten)]
    pub stats: ActivityStats,
}

/// Aggregate the current user's swims over a reporting window.
///
/// Defaults to the all-time totals.
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<PeriodStatsResponse>, ApiError> {
    let period = query.period.unwrap_or(StatsPeriod::Total);
    let records = state
        .store
        .list_activities_since(&auth.user_id, period.start(Utc::now()))?;

    Ok(Json(PeriodStatsResponse {
        period,
        stats: ActivityStats::from_records(&records),
    }))
}
