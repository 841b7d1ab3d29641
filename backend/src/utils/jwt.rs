//! JWT token utilities for authentication.
//!
//! Provides token creation and validation for the bearer tokens handed out on
//! login and checked by the `jwt_auth` middleware.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::config::Config;

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Token issued at timestamp
    pub iat: usize,
    /// Token expiration timestamp, absent when tokens do not expire
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<usize>,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token generation failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
    #[error("Token validation failed: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

/// Issues and verifies HS256 tokens signed with the server secret.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expires_in: Option<Duration>,
}

impl TokenIssuer {
    /// Create a new TokenIssuer. `expires_in_seconds = None` issues tokens
    /// without an `exp` claim.
    pub fn new(secret: &str, expires_in_seconds: Option<u64>) -> Self {
        let encoding_key = EncodingKey::from_secret(secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims = HashSet::from(["sub".to_string()]);
        validation.validate_exp = true;

        TokenIssuer {
            encoding_key,
            decoding_key,
            validation,
            expires_in: expires_in_seconds.map(|seconds| Duration::seconds(seconds as i64)),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.jwt_secret, config.jwt_expires_in_seconds)
    }

    /// Generate a signed token for the given subject.
    pub fn issue(&self, subject: &str) -> Result<String, TokenError> {
        let now = Utc::now();

        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp() as usize,
            exp: self
                .expires_in
                .map(|lifetime| (now + lifetime).timestamp() as usize),
        };

        self.sign(&claims)
    }

    /// Validate and decode a token. Expiry is checked whenever the token
    /// carries an `exp` claim.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|token_data| token_data.claims)
            .map_err(TokenError::Invalid)
    }

    /// Subject of a valid token.
    pub fn subject(&self, token: &str) -> Result<String, TokenError> {
        self.verify(token).map(|claims| claims.sub)
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(TokenError::Signing)
    }
}

impl Claims {
    pub fn user_id(&self) -> &str {
        &self.sub
    }
}
