//! Like and comment handlers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use swimclub_core::{Comment, CommentId, LikeTarget, MomentId};
use swimclub_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::users::UserSummary;
use crate::state::AppState;

/// Like toggle request.
///
/// The target is `{"target_type": "moment"|"comment", "target_id": "..."}`.
#[derive(Debug, Deserialize)]
pub struct ToggleLikeRequest {
    /// The like target.
    #[serde(flatten)]
    pub target: LikeTarget,
}

/// Like toggle response.
#[derive(Debug, Serialize)]
pub struct ToggleLikeResponse {
    /// Whether the like now exists.
    pub liked: bool,
    /// The target's like count after the toggle.
    pub like_count: i64,
}

/// Toggle a like on a moment or comment.
///
/// The first call creates the like and bumps the counter; the second call
/// removes it and restores the counter.
pub async fn toggle_like(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(request): Json<ToggleLikeRequest>,
) -> Result<Json<ToggleLikeResponse>, ApiError> {
    let outcome = state.store.toggle_like(&auth.user_id, request.target)?;

    Ok(Json(ToggleLikeResponse {
        liked: outcome.liked,
        like_count: outcome.like_count,
    }))
}

/// Comment creation request.
#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    /// The moment being commented on.
    pub moment_id: MomentId,
    /// Comment text.
    pub content: String,
    /// Optional comment being replied to.
    #[serde(default)]
    pub reply_to: Option<CommentId>,
}

/// Comment representation in responses.
#[derive(Debug, Serialize)]
pub struct CommentResponse {
    /// Comment ID.
    pub id: String,
    /// The moment this comment belongs to.
    pub moment_id: String,
    /// Author.
    pub author: Option<UserSummary>,
    /// Comment text.
    pub content: String,
    /// Comment being replied to, if any.
    pub reply_to: Option<String>,
    /// Like count.
    pub like_count: i64,
    /// Creation timestamp.
    pub created_at: String,
}

impl CommentResponse {
    fn build(comment: &Comment, author: Option<UserSummary>) -> Self {
        Self {
            id: comment.id.to_string(),
            moment_id: comment.moment_id.to_string(),
            author,
            content: comment.content.clone(),
            reply_to: comment.reply_to.map(|id| id.to_string()),
            like_count: comment.like_count,
            created_at: comment.created_at.to_rfc3339(),
        }
    }
}

/// Comment creation response.
#[derive(Debug, Serialize)]
pub struct CreateCommentResponse {
    /// The created comment.
    pub comment: CommentResponse,
    /// The moment's comment count after the insert.
    pub comment_count: i64,
}

/// Comment on a moment.
pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(request): Json<CreateCommentRequest>,
) -> Result<Json<CreateCommentResponse>, ApiError> {
    if request.content.is_empty() {
        return Err(ApiError::BadRequest("comment must not be empty".into()));
    }

    let author = state
        .store
        .get_user(&auth.user_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let comment = Comment::new(
        request.moment_id,
        auth.user_id,
        request.content,
        request.reply_to,
    );
    let moment = state.store.create_comment(&comment)?;

    Ok(Json(CreateCommentResponse {
        comment: CommentResponse::build(&comment, Some(UserSummary::from(&author))),
        comment_count: moment.comment_count,
    }))
}

/// Comment list query parameters.
#[derive(Debug, Deserialize)]
pub struct ListCommentsQuery {
    /// The moment whose comments to list.
    pub moment_id: MomentId,
    /// Maximum number of comments to return (default: 20).
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Offset for pagination (default: 0).
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    20
}

/// Comment list response.
#[derive(Debug, Serialize)]
pub struct ListCommentsResponse {
    /// Comments, newest first.
    pub comments: Vec<CommentResponse>,
    /// Total live comments on the moment.
    pub total: usize,
}

/// List comments on a moment, newest first.
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Query(query): Query<ListCommentsQuery>,
) -> Result<Json<ListCommentsResponse>, ApiError> {
    let limit = query.limit.min(100);
    let (comments, total) = state
        .store
        .list_comments(&query.moment_id, limit, query.offset)?;

    let mut responses = Vec::with_capacity(comments.len());
    for comment in &comments {
        let author = state
            .store
            .get_user(&comment.author)?
            .as_ref()
            .map(UserSummary::from);
        responses.push(CommentResponse::build(comment, author));
    }

    Ok(Json(ListCommentsResponse {
        comments: responses,
        total,
    }))
}

/// Delete one's own comment (soft delete).
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(comment_id): Path<CommentId>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let comment = state
        .store
        .get_comment(&comment_id)?
        .filter(|c| !c.is_deleted)
        .ok_or_else(|| ApiError::NotFound("Comment not found".into()))?;

    if comment.author != auth.user_id {
        return Err(ApiError::Forbidden(
            "only the author can delete a comment".into(),
        ));
    }

    state.store.soft_delete_comment(&comment_id)?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}
