//! Leaderboard handlers.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use swimclub_core::{RankType, RankingRecord};
use swimclub_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::users::UserSummary;
use crate::leaderboard;
use crate::state::AppState;

/// Rankings query parameters.
#[derive(Debug, Deserialize)]
pub struct RankingsQuery {
    /// Ranking dimension (default: total).
    #[serde(rename = "type", default)]
    pub rank_type: Option<RankType>,
    /// Maximum number of rows to return (default: 50).
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

/// One leaderboard row.
#[derive(Debug, Serialize)]
pub struct RankingRow {
    /// Position, starting at 1. Zero means not yet ranked.
    pub rank: u32,
    /// The ranked user.
    pub user: Option<UserSummary>,
    /// Accumulated distance in meters.
    pub total_distance: i64,
    /// Number of recorded swims.
    pub activity_count: i64,
    /// Whether the requesting user follows this user.
    pub is_following: bool,
}

/// Leaderboard response.
#[derive(Debug, Serialize)]
pub struct RankingsResponse {
    /// The queried dimension.
    #[serde(rename = "type")]
    pub rank_type: RankType,
    /// Rows in rank order.
    pub rankings: Vec<RankingRow>,
}

fn annotate_rows(
    state: &AppState,
    viewer: &AuthUser,
    records: Vec<RankingRecord>,
) -> Result<Vec<RankingRow>, ApiError> {
    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        let user = state
            .store
            .get_user(&record.user_id)?
            .as_ref()
            .map(UserSummary::from);
        let is_following = record.user_id != viewer.user_id
            && state.store.is_following(&viewer.user_id, &record.user_id)?;
        rows.push(RankingRow {
            rank: record.rank,
            user,
            total_distance: record.total_distance,
            activity_count: record.activity_count,
            is_following,
        });
    }
    Ok(rows)
}

/// Get the top rankings for a dimension, annotated with follow state.
pub async fn get_top_rankings(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<RankingsQuery>,
) -> Result<Json<RankingsResponse>, ApiError> {
    let rank_type = query.rank_type.unwrap_or(RankType::Total);
    let limit = query.limit.min(100);

    let records = state.store.top_rankings(rank_type, limit)?;
    let rankings = annotate_rows(&state, &auth, records)?;

    Ok(Json(RankingsResponse {
        rank_type,
        rankings,
    }))
}

/// The current user's position in one dimension.
#[derive(Debug, Serialize)]
pub struct MyRankingResponse {
    /// The queried dimension.
    #[serde(rename = "type")]
    pub rank_type: RankType,
    /// Position, starting at 1. Zero means not yet ranked.
    pub rank: u32,
    /// Accumulated distance in meters.
    pub total_distance: i64,
    /// Number of recorded swims.
    pub activity_count: i64,
}

/// Get the current user's ranking in a dimension.
///
/// Users with no recorded distance get a zeroed, unranked row.
pub async fn get_my_ranking(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<RankingsQuery>,
) -> Result<Json<MyRankingResponse>, ApiError> {
    let rank_type = query.rank_type.unwrap_or(RankType::Total);
    let record = state.store.get_ranking(&auth.user_id, rank_type)?;

    let response = match record {
        Some(r) => MyRankingResponse {
            rank_type,
            rank: r.rank,
            total_distance: r.total_distance,
            activity_count: r.activity_count,
        },
        None => MyRankingResponse {
            rank_type,
            rank: 0,
            total_distance: 0,
            activity_count: 0,
        },
    };
    Ok(Json(response))
}

/// Regional rankings query parameters.
#[derive(Debug, Deserialize)]
pub struct RegionalRankingsQuery {
    /// Ranking dimension (default: total).
    #[serde(rename = "type", default)]
    pub rank_type: Option<RankType>,
    /// City to filter by. A bare name matches its suffixed form
    /// (e.g. "北京" matches "北京市").
    pub city: String,
    /// Administrative city code; when both sides carry one it wins over
    /// the name comparison.
    #[serde(default, alias = "cityCode")]
    pub city_code: Option<String>,
}

/// Get the rankings restricted to one city.
pub async fn get_regional_rankings(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<RegionalRankingsQuery>,
) -> Result<Json<RankingsResponse>, ApiError> {
    if query.city.is_empty() {
        return Err(ApiError::BadRequest("city must not be empty".into()));
    }
    let rank_type = query.rank_type.unwrap_or(RankType::Total);

    let records =
        state
            .store
            .regional_rankings(rank_type, &query.city, query.city_code.as_deref())?;
    let rankings = annotate_rows(&state, &auth, records)?;

    Ok(Json(RankingsResponse {
        rank_type,
        rankings,
    }))
}

/// Ranking sync request.
#[derive(Debug, Deserialize)]
pub struct SyncRankingsRequest {
    /// Distance to add, in meters.
    pub distance: i64,
    /// Dimension to sync. Omitted means every dimension.
    #[serde(rename = "type", default)]
    pub rank_type: Option<RankType>,
}

/// Ranking sync response.
#[derive(Debug, Serialize)]
pub struct SyncRankingsResponse {
    /// The caller's refreshed record in the synced dimension
    /// (total when fanning out).
    pub ranking: MyRankingResponse,
}

/// Push a distance into the rankings and recompute positions.
pub async fn sync_rankings(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(request): Json<SyncRankingsRequest>,
) -> Result<Json<SyncRankingsResponse>, ApiError> {
    if request.distance <= 0 {
        return Err(ApiError::BadRequest("distance must be positive".into()));
    }
    let user = state
        .store
        .get_user(&auth.user_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let primary = match request.rank_type {
        Some(rank_type) => {
            leaderboard::sync_dimension(
                &state.store,
                &auth.user_id,
                rank_type,
                request.distance,
                Some(&user.region),
            )?;
            rank_type
        }
        None => {
            leaderboard::apply_swim_distance(
                &state.store,
                &auth.user_id,
                request.distance,
                Some(&user.region),
            )?;
            RankType::Total
        }
    };

    let record = state
        .store
        .get_ranking(&auth.user_id, primary)?
        .ok_or_else(|| ApiError::Internal("ranking record missing after sync".into()))?;

    Ok(Json(SyncRankingsResponse {
        ranking: MyRankingResponse {
            rank_type: primary,
            rank: record.rank,
            total_distance: record.total_distance,
            activity_count: record.activity_count,
        },
    }))
}
