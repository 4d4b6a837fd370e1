//! User registration and profile handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use swimclub_core::{Region, User, UserId};
use swimclub_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// User registration request.
#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    /// External identity (e.g. a WeChat `openid`).
    pub open_id: String,
    /// Display name.
    pub nickname: String,
    /// Avatar URL.
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Home region.
    #[serde(default)]
    pub region: Option<Region>,
}

/// User profile response.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// User ID.
    pub id: String,
    /// External identity.
    pub open_id: String,
    /// Display name.
    pub nickname: String,
    /// Avatar URL.
    pub avatar_url: Option<String>,
    /// Home region.
    pub region: Region,
    /// Follower count.
    pub followers: i64,
    /// Following count.
    pub following: i64,
    /// Accumulated points.
    pub points: i64,
    /// Registration timestamp.
    pub created_at: String,
}

/// Compact user representation embedded in listings.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    /// User ID.
    pub id: String,
    /// Display name.
    pub nickname: String,
    /// Avatar URL.
    pub avatar_url: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            nickname: user.nickname.clone(),
            avatar_url: user.avatar_url.clone(),
        }
    }
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            open_id: user.open_id.clone(),
            nickname: user.nickname.clone(),
            avatar_url: user.avatar_url.clone(),
            region: user.region.clone(),
            followers: user.followers,
            following: user.following,
            points: user.points,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Register a user, or return the existing profile for a known identity.
///
/// Re-registration with a known `open_id` updates the mutable profile
/// fields and returns the same user ID.
pub async fn register_user(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    if request.open_id.is_empty() {
        return Err(ApiError::BadRequest("open_id must not be empty".into()));
    }
    if request.nickname.is_empty() {
        return Err(ApiError::BadRequest("nickname must not be empty".into()));
    }

    let user = match state.store.find_user_by_open_id(&request.open_id)? {
        Some(mut existing) => {
            existing.nickname = request.nickname;
            existing.avatar_url = request.avatar_url;
            if let Some(region) = request.region {
                existing.region = region;
            }
            existing.updated_at = chrono::Utc::now();
            state.store.put_user(&existing)?;
            existing
        }
        None => {
            let mut user = User::new(request.open_id, request.nickname);
            user.avatar_url = request.avatar_url;
            if let Some(region) = request.region {
                user.region = region;
            }
            state.store.put_user(&user)?;
            tracing::info!(user_id = %user.id, "Registered new user");
            user
        }
    };

    Ok(Json(UserResponse::from(&user)))
}

/// Get the current user's profile.
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .store
        .get_user(&auth.user_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    Ok(Json(UserResponse::from(&user)))
}

/// Get another user's public profile.
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Path(user_id): Path<UserId>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .store
        .get_user(&user_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    Ok(Json(UserResponse::from(&user)))
}
