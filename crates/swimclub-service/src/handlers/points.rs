//! Points ledger and daily task handlers.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use swimclub_core::{PointsHistoryEntry, TaskStatus, TaskType};
use swimclub_store::{Store, TaskOutcome};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Points balance response.
#[derive(Debug, Serialize)]
pub struct PointsResponse {
    /// Accumulated points.
    pub total_points: i64,
}

/// Get the current user's points balance.
pub async fn get_points(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<PointsResponse>, ApiError> {
    let account = state.store.get_or_create_points_account(&auth.user_id)?;

    Ok(Json(PointsResponse {
        total_points: account.total_points,
    }))
}

/// Task completion request.
#[derive(Debug, Deserialize)]
pub struct CompleteTaskRequest {
    /// The task to complete (e.g. `"SWIM_500M"`).
    #[serde(rename = "type")]
    pub task_type: TaskType,
}

/// Task completion response.
#[derive(Debug, Serialize)]
pub struct CompleteTaskResponse {
    /// Whether this call awarded the task.
    pub completed: bool,
    /// Points awarded by this call (0 when already completed today).
    pub points: i64,
    /// The account balance after the call.
    pub total_points: i64,
}

/// Complete a daily task.
///
/// Each task awards at most once per calendar day; repeats succeed but
/// award nothing.
pub async fn complete_task(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(request): Json<CompleteTaskRequest>,
) -> Result<Json<CompleteTaskResponse>, ApiError> {
    let outcome =
        state
            .store
            .complete_daily_task(&auth.user_id, request.task_type, chrono::Utc::now())?;

    let response = match outcome {
        TaskOutcome::Awarded {
            points,
            total_points,
        } => CompleteTaskResponse {
            completed: true,
            points,
            total_points,
        },
        TaskOutcome::AlreadyCompleted => {
            let account = state.store.get_or_create_points_account(&auth.user_id)?;
            CompleteTaskResponse {
                completed: false,
                points: 0,
                total_points: account.total_points,
            }
        }
    };
    Ok(Json(response))
}

/// History query parameters.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Maximum number of entries to return (default: 50).
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Offset for pagination (default: 0).
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

/// One points history entry.
#[derive(Debug, Serialize)]
pub struct HistoryEntryResponse {
    /// Entry ID.
    pub id: String,
    /// The task that produced the entry.
    #[serde(rename = "type")]
    pub task_type: TaskType,
    /// Points awarded.
    pub points: i64,
    /// Award timestamp.
    pub created_at: String,
}

impl From<&PointsHistoryEntry> for HistoryEntryResponse {
    fn from(entry: &PointsHistoryEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            task_type: entry.task_type,
            points: entry.points,
            created_at: entry.created_at.to_rfc3339(),
        }
    }
}

/// Points history response.
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    /// Entries, newest first.
    pub history: Vec<HistoryEntryResponse>,
    /// Whether there are more entries.
    pub has_more: bool,
}

/// Get the current user's points history, newest first.
pub async fn get_points_history(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    // Fetch one more than requested to determine has_more
    let limit = query.limit.min(100);
    let entries = state
        .store
        .list_points_history(&auth.user_id, limit + 1, query.offset)?;

    let has_more = entries.len() > limit;
    let history: Vec<_> = entries
        .iter()
        .take(limit)
        .map(HistoryEntryResponse::from)
        .collect();

    Ok(Json(HistoryResponse { history, has_more }))
}

/// Daily task statuses response.
#[derive(Debug, Serialize)]
pub struct DailyTasksResponse {
    /// Today's task statuses, in task order.
    pub tasks: Vec<TaskStatus>,
}

/// Get today's task statuses for the current user.
pub async fn get_daily_tasks(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<DailyTasksResponse>, ApiError> {
    let tasks = state
        .store
        .daily_task_statuses(&auth.user_id, chrono::Utc::now())?;

    Ok(Json(DailyTasksResponse { tasks }))
}
