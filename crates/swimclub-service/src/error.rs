//! API error types and responses.
//!
//! All errors serialize to the flat envelope the mobile client expects:
//! `{"code": <http status>, "message": "...", "data": null}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unauthorized - missing or invalid credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Forbidden - valid credentials but the action is not allowed.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Conflict - resource already exists or invalid state transition.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Flat JSON error envelope.
#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    code: u16,
    message: String,
    data: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorEnvelope {
            code: status.as_u16(),
            message,
            data: None,
        };

        (status, Json(body)).into_response()
    }
}

impl From<swimclub_store::StoreError> for ApiError {
    fn from(err: swimclub_store::StoreError) -> Self {
        match err {
            swimclub_store::StoreError::NotFound { entity, id } => {
                Self::NotFound(format!("{entity} not found: {id}"))
            }
            swimclub_store::StoreError::MissingCounter { entity, field } => {
                Self::BadRequest(format!("counter {field} not present on {entity}"))
            }
            swimclub_store::StoreError::Database(msg)
            | swimclub_store::StoreError::Serialization(msg) => Self::Internal(msg),
        }
    }
}
