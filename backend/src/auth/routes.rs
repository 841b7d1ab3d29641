//! Defines the HTTP routes for authentication.
//!
//! `POST /register` and `POST /login` are public; `GET /dashboard` sits
//! behind the `jwt_auth` middleware.

use crate::auth::handlers::*;
use crate::auth::middleware::*;
use crate::auth::state::AppState;
use axum::{
    Extension, Router, middleware,
    routing::{get, post},
};

/// Creates the router with all auth-related routes
pub fn auth_router(state: AppState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/dashboard", get(dashboard).layer(middleware::from_fn(jwt_auth)))
        .layer(Extension(state))
}
