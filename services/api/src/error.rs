//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and its mapping
//! to HTTP responses. Every handler-level error is converted here into a
//! `{success: false, message}` JSON body with the appropriate status; raw
//! driver errors never reach the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::config::ConfigError;
use divineverse_core::ports::PortError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Malformed or missing input. The message is user-facing.
    #[error("{0}")]
    Validation(String),

    /// A duplicate unique key (e.g. an already-registered email).
    #[error("{0}")]
    Conflict(String),

    /// No matching record. The message is user-facing.
    #[error("{0}")]
    NotFound(String),

    /// Bad credentials or a missing/expired/invalid token.
    #[error("{0}")]
    Auth(String),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An unexpected failure carrying a user-facing message. The underlying
    /// cause is logged at the call site.
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Port(err) => port_status_and_message(err),
            ApiError::Config(err) => {
                tracing::error!("configuration error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server configuration error. Please try again later.".to_string(),
                )
            }
            ApiError::Database(err) => {
                tracing::error!("database error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong. Please try again later.".to_string(),
                )
            }
            ApiError::Io(err) => {
                tracing::error!("io error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong. Please try again later.".to_string(),
                )
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        fail(status, &message)
    }
}

/// Builds a `{success: false, message}` JSON response with the given status.
fn fail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "message": message }))).into_response()
}

fn port_status_and_message(err: PortError) -> (StatusCode, String) {
    match err {
        PortError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        PortError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        PortError::RateLimited => (
            StatusCode::TOO_MANY_REQUESTS,
            "Too many requests. Please try again shortly.".to_string(),
        ),
        PortError::Configuration(msg) => {
            tracing::error!("configuration error: {msg}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server configuration error. Please try again later.".to_string(),
            )
        }
        PortError::Unexpected(msg) => {
            tracing::error!("unexpected service error: {msg}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong. Please try again later.".to_string(),
            )
        }
    }
}
