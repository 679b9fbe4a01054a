//! services/api/src/web/rest.rs
//!
//! Contains the health-check handler and the master definition for the
//! OpenAPI specification.

use axum::Json;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::web::ask::{AskRequest, AskResponse};
use crate::web::auth::{AuthResponse, LoginRequest, MessageResponse, SignupRequest, UserView};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::auth::signup_handler,
        crate::web::auth::login_handler,
        crate::web::auth::logout_handler,
        crate::web::ask::ask_handler,
        health_handler,
    ),
    components(
        schemas(
            SignupRequest,
            LoginRequest,
            UserView,
            AuthResponse,
            MessageResponse,
            AskRequest,
            AskResponse,
            HealthResponse
        )
    ),
    tags(
        (name = "DivineVerse API", description = "Auth and chat endpoints for the DivineVerse app.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Handlers
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub message: String,
}

/// GET / - Liveness check.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Server is up", body = HealthResponse)
    )
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "Server is running successfully!".to_string(),
    })
}
