//! Moment (status post) handlers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use swimclub_core::{LikeTarget, Moment, MomentId, TaskType};
use swimclub_store::{Store, TaskOutcome};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::users::UserSummary;
use crate::state::AppState;

/// Moment creation request.
#[derive(Debug, Deserialize)]
pub struct CreateMomentRequest {
    /// Post text.
    pub content: String,
    /// Attached image URLs.
    #[serde(default)]
    pub images: Vec<String>,
}

/// Moment representation in responses.
#[derive(Debug, Serialize)]
pub struct MomentResponse {
    /// Moment ID.
    pub id: String,
    /// Author.
    pub author: Option<UserSummary>,
    /// Post text.
    pub content: String,
    /// Attached image URLs.
    pub images: Vec<String>,
    /// Like count.
    pub like_count: i64,
    /// Comment count.
    pub comment_count: i64,
    /// Whether the requesting user has liked this moment.
    pub liked: bool,
    /// Creation timestamp.
    pub created_at: String,
}

impl MomentResponse {
    fn build(moment: &Moment, author: Option<UserSummary>, liked: bool) -> Self {
        Self {
            id: moment.id.to_string(),
            author,
            content: moment.content.clone(),
            images: moment.images.clone(),
            like_count: moment.like_count,
            comment_count: moment.comment_count,
            liked,
            created_at: moment.created_at.to_rfc3339(),
        }
    }
}

/// Moment creation response.
#[derive(Debug, Serialize)]
pub struct CreateMomentResponse {
    /// The created moment.
    pub moment: MomentResponse,
    /// Points awarded by the daily post task (0 if already completed today).
    pub points_awarded: i64,
}

/// Create a moment.
///
/// Posting completes the daily `POST_STATUS` task; repeats within the same
/// day post fine but award nothing.
pub async fn create_moment(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(request): Json<CreateMomentRequest>,
) -> Result<Json<CreateMomentResponse>, ApiError> {
    if request.content.is_empty() && request.images.is_empty() {
        return Err(ApiError::BadRequest(
            "moment needs text or images".into(),
        ));
    }

    let author = state
        .store
        .get_user(&auth.user_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let moment = Moment::new(auth.user_id, request.content, request.images);
    state.store.put_moment(&moment)?;

    let points_awarded = match state.store.complete_daily_task(
        &auth.user_id,
        TaskType::PostStatus,
        chrono::Utc::now(),
    )? {
        TaskOutcome::Awarded { points, .. } => points,
        TaskOutcome::AlreadyCompleted => 0,
    };

    Ok(Json(CreateMomentResponse {
        moment: MomentResponse::build(&moment, Some(UserSummary::from(&author)), false),
        points_awarded,
    }))
}

/// Moment list query parameters.
#[derive(Debug, Deserialize)]
pub struct ListMomentsQuery {
    /// Maximum number of moments to return (default: 20).
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Offset for pagination (default: 0).
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    20
}

/// Moment list response.
#[derive(Debug, Serialize)]
pub struct ListMomentsResponse {
    /// Moments, newest first.
    pub moments: Vec<MomentResponse>,
}

/// List moments, newest first.
pub async fn list_moments(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<ListMomentsQuery>,
) -> Result<Json<ListMomentsResponse>, ApiError> {
    let limit = query.limit.min(100);
    let moments = state.store.list_moments(limit, query.offset)?;

    let mut responses = Vec::with_capacity(moments.len());
    for moment in &moments {
        let author = state
            .store
            .get_user(&moment.author)?
            .as_ref()
            .map(UserSummary::from);
        let liked = state
            .store
            .has_liked(&auth.user_id, LikeTarget::Moment(moment.id))?;
        responses.push(MomentResponse::build(moment, author, liked));
    }

    Ok(Json(ListMomentsResponse { moments: responses }))
}

/// Delete one's own moment (soft delete).
pub async fn delete_moment(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(moment_id): Path<MomentId>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let moment = state
        .store
        .get_moment(&moment_id)?
        .filter(|m| !m.is_deleted)
        .ok_or_else(|| ApiError::NotFound("Moment not found".into()))?;

    if moment.author != auth.user_id {
        return Err(ApiError::Forbidden(
            "only the author can delete a moment".into(),
        ));
    }

    state.store.soft_delete_moment(&moment_id)?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}
