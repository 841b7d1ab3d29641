//! Middleware for protecting authenticated routes.
//!
//! Validates the bearer token with the shared `TokenIssuer` and makes the
//! verified claims available to handlers through request extensions.

use crate::api::common::unauthorized;
use crate::auth::state::AppState;
use axum::{
    extract::{Extension, Request},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

/// JWT authentication middleware
pub async fn jwt_auth(
    Extension(state): Extension<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    // Extract Authorization header
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            tracing::debug!("Rejected request without bearer token");
            unauthorized()
        })?;

    match state.token_issuer.verify(token) {
        Ok(claims) => {
            // Add claims to request extensions for use in handlers
            request.extensions_mut().insert(claims);
            Ok(next.run(request).await)
        }
        Err(e) => {
            tracing::warn!("Rejected bearer token: {}", e);
            Err(unauthorized())
        }
    }
}
