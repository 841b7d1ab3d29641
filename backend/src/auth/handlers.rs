//! Handler functions for authentication-related API endpoints.
//!
//! These functions parse incoming JSON or form bodies, hand them to
//! `auth::service::AuthService` and translate the outcome into HTTP
//! responses.

use crate::api::common::{ApiError, JsonOrForm, auth_error_to_http};
use crate::auth::models::*;
use crate::auth::state::AppState;
use crate::utils::Claims;
use axum::extract::Extension;
use axum::response::Json as ResponseJson;

/// Handle user registration request
#[axum::debug_handler]
pub async fn register(
    Extension(state): Extension<AppState>,
    JsonOrForm(payload): JsonOrForm<RegisterRequest>,
) -> Result<ResponseJson<RegisterResponse>, ApiError> {
    match state.auth_service.register(payload).await {
        Ok(response) => Ok(ResponseJson(response)),
        Err(error) => Err(auth_error_to_http(error)),
    }
}

/// Handle user login request
#[axum::debug_handler]
pub async fn login(
    Extension(state): Extension<AppState>,
    JsonOrForm(payload): JsonOrForm<LoginRequest>,
) -> Result<ResponseJson<LoginResponse>, ApiError> {
    match state.auth_service.login(payload).await {
        Ok(response) => Ok(ResponseJson(response)),
        Err(error) => Err(auth_error_to_http(error)),
    }
}

/// Protected welcome payload
#[axum::debug_handler]
pub async fn dashboard(Extension(claims): Extension<Claims>) -> ResponseJson<DashboardResponse> {
    tracing::debug!("Dashboard accessed by user {}", claims.user_id());

    ResponseJson(DashboardResponse {
        message: "Welcome to dashboard".to_string(),
    })
}
