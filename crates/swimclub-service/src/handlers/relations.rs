//! Follow and block handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use swimclub_core::UserId;
use swimclub_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::users::UserSummary;
use crate::state::AppState;

/// Relation mutation response.
#[derive(Debug, Serialize)]
pub struct RelationResponse {
    /// Whether the relation is now active.
    pub active: bool,
    /// Whether this call changed anything.
    pub changed: bool,
}

/// Follow a user.
///
/// Fails with 403 when the target has blocked the requester. Re-following
/// is a no-op and never drifts the counters.
pub async fn follow(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(user_id): Path<UserId>,
) -> Result<Json<RelationResponse>, ApiError> {
    if user_id == auth.user_id {
        return Err(ApiError::BadRequest("cannot follow yourself".into()));
    }
    state
        .store
        .get_user(&user_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    if state.store.is_blocked(&user_id, &auth.user_id)? {
        return Err(ApiError::Forbidden(
            "you have been blocked by this user".into(),
        ));
    }

    let changed = state.store.follow(&auth.user_id, &user_id)?;
    Ok(Json(RelationResponse {
        active: true,
        changed,
    }))
}

/// Unfollow a user.
pub async fn unfollow(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(user_id): Path<UserId>,
) -> Result<Json<RelationResponse>, ApiError> {
    if user_id == auth.user_id {
        return Err(ApiError::BadRequest("cannot unfollow yourself".into()));
    }

    let changed = state.store.unfollow(&auth.user_id, &user_id)?;
    Ok(Json(RelationResponse {
        active: false,
        changed,
    }))
}

/// Block a user.
///
/// Blocking severs any follow relationship in both directions first, so
/// neither side keeps a stale follower/following edge.
pub async fn block(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(user_id): Path<UserId>,
) -> Result<Json<RelationResponse>, ApiError> {
    if user_id == auth.user_id {
        return Err(ApiError::Conflict("cannot block yourself".into()));
    }
    state
        .store
        .get_user(&user_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    state.store.unfollow(&auth.user_id, &user_id)?;
    state.store.unfollow(&user_id, &auth.user_id)?;

    let changed = state.store.block(&auth.user_id, &user_id)?;
    Ok(Json(RelationResponse {
        active: true,
        changed,
    }))
}

/// Unblock a user.
pub async fn unblock(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(user_id): Path<UserId>,
) -> Result<Json<RelationResponse>, ApiError> {
    if user_id == auth.user_id {
        return Err(ApiError::Conflict("cannot unblock yourself".into()));
    }

    let changed = state.store.unblock(&auth.user_id, &user_id)?;
    Ok(Json(RelationResponse {
        active: false,
        changed,
    }))
}

/// User listing response.
#[derive(Debug, Serialize)]
pub struct UserListResponse {
    /// The listed users.
    pub users: Vec<UserSummary>,
    /// Total count.
    pub total: usize,
}

fn summarize(state: &AppState, ids: Vec<UserId>) -> Result<UserListResponse, ApiError> {
    let mut users = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(user) = state.store.get_user(&id)? {
            users.push(UserSummary::from(&user));
        }
    }
    let total = users.len();
    Ok(UserListResponse { users, total })
}

/// List the current user's followers.
pub async fn list_followers(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<UserListResponse>, ApiError> {
    let ids = state.store.list_followers(&auth.user_id)?;
    Ok(Json(summarize(&state, ids)?))
}

/// List the users the current user follows.
pub async fn list_following(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<UserListResponse>, ApiError> {
    let ids = state.store.list_following(&auth.user_id)?;
    Ok(Json(summarize(&state, ids)?))
}

/// List the users the current user has blocked.
pub async fn list_blocked(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<UserListResponse>, ApiError> {
    let ids = state.store.list_blocked(&auth.user_id)?;
    Ok(Json(summarize(&state, ids)?))
}
