//! Global application error types.
//!
//! This module defines the errors raised by the credential store and by the
//! authentication flows. Request-scoped errors are mapped to HTTP responses in
//! `api::common`; startup errors live next to the connection manager.

use thiserror::Error;

/// Errors raised by a credential store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A record with this username already exists.
    #[error("Username already exists: {0}")]
    DuplicateUsername(String),
    /// Any other datastore failure.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Errors surfaced by the authentication service.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{message}")]
    InvalidInput { message: String },

    #[error("Username already taken")]
    UsernameTaken,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Internal error: {message}")]
    Internal { message: String },
}

pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::DuplicateUsername(_) => AuthError::UsernameTaken,
            StoreError::Database(source) => AuthError::internal(format!("Database error: {}", source)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_username_maps_to_username_taken() {
        let error: AuthError = StoreError::DuplicateUsername("alice".into()).into();
        assert!(matches!(error, AuthError::UsernameTaken));
        assert_eq!(error.to_string(), "Username already taken");
    }

    #[test]
    fn test_database_failure_maps_to_internal() {
        let error: AuthError = StoreError::Database(sqlx::Error::PoolTimedOut).into();
        assert!(matches!(error, AuthError::Internal { ref message } if message.contains("Database error")));
    }
}
