//! Core business logic for the authentication system.

use crate::auth::models::*;
use crate::errors::{AuthError, AuthResult};
use crate::repositories::CredentialStore;
use crate::utils::{PasswordHasher, TokenIssuer};
use std::sync::Arc;
use tracing::{debug, info, warn};
use validator::Validate;

/// Authentication service for handling registration and login
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    tokens: Arc<TokenIssuer>,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: PasswordHasher,
        tokens: Arc<TokenIssuer>,
    ) -> Self {
        AuthService {
            store,
            hasher,
            tokens,
        }
    }

    pub fn token_issuer(&self) -> &Arc<TokenIssuer> {
        &self.tokens
    }

    /// Register a new user and return its public projection
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<RegisterResponse> {
        // Validate input
        let mut error_messages: Vec<String> = match request.validate() {
            Ok(()) => Vec::new(),
            Err(validation_errors) => validation_errors
                .field_errors()
                .into_iter()
                .flat_map(|(field, errors)| {
                    errors.iter().map(move |error| {
                        format!(
                            "{}: {}",
                            field,
                            error.message.as_ref().unwrap_or(&"Invalid value".into())
                        )
                    })
                })
                .collect(),
        };
        // Byte length, not character count: bcrypt works on the UTF-8 bytes.
        if request.password.len() > PasswordHasher::MAX_PASSWORD_BYTES {
            error_messages.push(format!(
                "password: Password must be at most {} bytes",
                PasswordHasher::MAX_PASSWORD_BYTES
            ));
        }
        if !error_messages.is_empty() {
            error_messages.sort();
            return Err(AuthError::invalid_input(error_messages.join(", ")));
        }

        if self.store.find_by_username(&request.username).await?.is_some() {
            debug!("Registration rejected, username exists: {}", request.username);
            return Err(AuthError::UsernameTaken);
        }

        let password_hash = self.hash_password(request.password).await?;

        // A concurrent registration may win between the lookup and the insert;
        // the store reports it as a duplicate, which maps to UsernameTaken.
        let user = self
            .store
            .insert(&request.username, &password_hash)
            .await?;

        info!("Registered user {} ({})", user.username, user.id);
        Ok(RegisterResponse::from(user))
    }

    /// Authenticate a user and issue a bearer token
    pub async fn login(&self, request: LoginRequest) -> AuthResult<LoginResponse> {
        let Some(user) = self.store.find_by_username(&request.username).await? else {
            warn!("Login failed: unknown user {}", request.username);
            return Err(AuthError::InvalidCredentials);
        };

        if !self
            .verify_password(request.password, user.password_hash.clone())
            .await?
        {
            warn!("Login failed: wrong password for user {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        let token = self
            .tokens
            .issue(&user.id)
            .map_err(|e| AuthError::internal(e.to_string()))?;

        info!("User {} logged in", user.id);
        Ok(LoginResponse { token })
    }

    async fn hash_password(&self, password: String) -> AuthResult<String> {
        let hasher = self.hasher;
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::internal(format!("Password hashing task failed: {}", e)))?
            .map_err(|e| AuthError::internal(format!("Password hashing failed: {}", e)))
    }

    async fn verify_password(&self, password: String, digest: String) -> AuthResult<bool> {
        let hasher = self.hasher;
        tokio::task::spawn_blocking(move || hasher.verify(&password, &digest))
            .await
            .map_err(|e| AuthError::internal(format!("Password verification task failed: {}", e)))
    }
}
