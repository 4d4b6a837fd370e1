//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{delete, get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    activities, health, interactions, moments, points, rankings, relations, users,
};
use crate::state::AppState;

/// Maximum concurrent requests for API endpoints.
///
/// Every ranking recompute and counter move funnels through the store's
/// mutation lock, so unbounded concurrency only grows the queue behind it.
const API_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
/// - `POST /v1/users` - Register or look up a user by external identity
///
/// ## Users
/// - `GET /v1/users/me` - Current user's profile
/// - `GET /v1/users/:id` - Another user's public profile
///
/// ## Rankings
/// - `GET /v1/rankings` - Top rankings for a dimension
/// - `GET /v1/rankings/me` - Current user's ranking
/// - `GET /v1/rankings/region` - Regional rankings
/// - `POST /v1/rankings/sync` - Push a distance into the rankings
///
/// ## Points
/// - `GET /v1/points` - Points balance
/// - `POST /v1/points/task` - Complete a daily task
/// - `GET /v1/points/history` - Points history (newest first)
/// - `GET /v1/points/daily-tasks` - Today's task statuses
///
/// ## Relations
/// - `POST|DELETE /v1/relations/follow/:user_id` - Follow / unfollow
/// - `POST|DELETE /v1/relations/block/:user_id` - Block / unblock
/// - `GET /v1/relations/followers|following|blocked` - Listings
///
/// ## Moments & interactions
/// - `POST|GET /v1/moments`, `DELETE /v1/moments/:id`
/// - `POST /v1/interactions/like` - Toggle a like
/// - `POST|GET /v1/interactions/comments`, `DELETE /v1/interactions/comments/:id`
///
/// ## Activities
/// - `POST /v1/activities` - Record a swim (rankings + milestones)
/// - `GET /v1/activities/latest` - Most recent swim
/// - `GET /v1/activities/records?period=` - Swims within a reporting window
/// - `GET /v1/activities/stats?period=` - Aggregated totals over a window
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    // Build CORS layer
    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    // Create concurrency-limited API routes
    let api_routes = Router::new()
        // Users
        .route("/users", post(users::register_user))
        .route("/users/me", get(users::get_me))
        .route("/users/:user_id", get(users::get_user))
        // Rankings
        .route("/rankings", get(rankings::get_top_rankings))
        .route("/rankings/me", get(rankings::get_my_ranking))
        .route("/rankings/region", get(rankings::get_regional_rankings))
        .route("/rankings/sync", post(rankings::sync_rankings))
        // Points
        .route("/points", get(points::get_points))
        .route("/points/task", post(points::complete_task))
        .route("/points/history", get(points::get_points_history))
        .route("/points/daily-tasks", get(points::get_daily_tasks))
        // Relations
        .route("/relations/follow/:user_id", post(relations::follow))
        .route("/relations/follow/:user_id", delete(relations::unfollow))
        .route("/relations/block/:user_id", post(relations::block))
        .route("/relations/block/:user_id", delete(relations::unblock))
        .route("/relations/followers", get(relations::list_followers))
        .route("/relations/following", get(relations::list_following))
        .route("/relations/blocked", get(relations::list_blocked))
        // Moments
        .route("/moments", post(moments::create_moment))
        .route("/moments", get(moments::list_moments))
        .route("/moments/:moment_id", delete(moments::delete_moment))
        // Interactions
        .route("/interactions/like", post(interactions::toggle_like))
        .route("/interactions/comments", post(interactions::create_comment))
        .route("/interactions/comments", get(interactions::list_comments))
        .route(
            "/interactions/comments/:comment_id",
            delete(interactions::delete_comment),
        )
        // Activities
        .route("/activities", post(activities::record_activity))
        .route("/activities/latest", get(activities::latest_activity))
        .route("/activities/records", get(activities::list_records))
        .route("/activities/stats", get(activities::get_stats))
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS));

    Router::new()
        // Health (public, no concurrency limit)
        .route("/health", get(health::health))
        // API v1 routes (concurrency limited)
        .nest("/v1", api_routes)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
