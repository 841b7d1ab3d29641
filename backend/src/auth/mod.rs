//! Authentication module for user registration, login and route protection.
//!
//! This module provides the public interface for authentication-related
//! functionality: the service implementing the flows, the HTTP handlers and
//! router exposing them, and the middleware guarding protected routes.

pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod service;
pub mod state;

// Re-exports for convenience
pub use routes::auth_router;
pub use service::AuthService;
pub use state::AppState;
