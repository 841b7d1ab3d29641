//! Shared state handed to handlers and middleware.

use crate::auth::service::AuthService;
use crate::config::Config;
use crate::repositories::{CredentialStore, UserRepository};
use crate::utils::{PasswordHasher, TokenIssuer};
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub token_issuer: Arc<TokenIssuer>,
}

impl AppState {
    /// Wires the service stack on top of an established connection pool.
    pub fn new(config: &Config, pool: SqlitePool) -> Self {
        Self::from_parts(
            Arc::new(UserRepository::new(pool)),
            PasswordHasher::new(config.bcrypt_cost),
            TokenIssuer::from_config(config),
        )
    }

    pub fn from_parts(
        store: Arc<dyn CredentialStore>,
        hasher: PasswordHasher,
        token_issuer: TokenIssuer,
    ) -> Self {
        let token_issuer = Arc::new(token_issuer);
        let auth_service = Arc::new(AuthService::new(store, hasher, Arc::clone(&token_issuer)));

        Self {
            auth_service,
            token_issuer,
        }
    }
}
