//! services/api/src/web/middleware.rs
//!
//! Authentication middleware and extractor for protecting routes.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::error::ApiError;
use crate::jwt::validate_token;
use crate::web::state::AppState;

const UNAUTHORIZED_MSG: &str = "Unauthorized. Please login.";

/// Middleware that validates the bearer token and extracts the user id.
///
/// If valid, inserts the user id into request extensions for handlers to use.
/// If missing, malformed, expired, or mis-signed, returns 401 Unauthorized
/// before the request reaches the handler.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // 1. Extract the Authorization header
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Auth(UNAUTHORIZED_MSG.to_string()))?;

    // 2. Expect the `Bearer <token>` scheme
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Auth(UNAUTHORIZED_MSG.to_string()))?;

    // 3. Validate signature and expiry
    let claims = validate_token(token, &state.config.jwt_secret).map_err(|e| {
        warn!("rejected session token: {e}");
        ApiError::Auth(UNAUTHORIZED_MSG.to_string())
    })?;

    // 4. Insert the user id into request extensions
    req.extensions_mut().insert(claims.sub);

    // 5. Continue to the handler
    Ok(next.run(req).await)
}

/// Authenticated user extracted from the request extensions populated by
/// [`require_auth`]. Using this as a handler parameter rejects with 401
/// when no authenticated user is attached to the request.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Uuid>()
            .copied()
            .map(|user_id| AuthUser { user_id })
            .ok_or_else(|| ApiError::Auth(UNAUTHORIZED_MSG.to_string()))
    }
}
