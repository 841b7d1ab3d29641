//! Credential-issuing authentication service.
//!
//! Registers users, verifies their credentials and hands out signed bearer
//! tokens for the protected dashboard route. The datastore connection is
//! established at startup with bounded retries.

pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod repositories;
pub mod utils;

pub use auth::{AppState, auth_router};
pub use config::Config;
