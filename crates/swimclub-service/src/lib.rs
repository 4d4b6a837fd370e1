//! Swimclub HTTP API Service.
//!
//! This crate provides the HTTP API for the swimclub backend, including:
//!
//! - User registration and profiles
//! - Swim activity recording
//! - Multi-dimensional leaderboards with regional views
//! - Daily-task points ledger
//! - Social graph (follow/block) and content interactions
//!
//! # Authentication
//!
//! End-user requests carry a bearer token. The test token format
//! `test-token:<user-uuid>` stands in for the upstream session validation
//! that fronts this service in production.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers need async for routing consistency

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod leaderboard;
pub mod routes;
pub mod state;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
