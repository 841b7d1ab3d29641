//! Error handling utilities for API responses.
//!
//! Every failed request answers with a JSON body of the form
//! `{"message": "..."}`. Client errors carry a descriptive message; server
//! faults are logged and answered with a generic one.

use crate::errors::AuthError;
use axum::Json;
use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::extract::{Form, FromRequest, Request};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Standard error body for all endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Status code and body returned by a failing handler
pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Converts AuthError to the HTTP response sent to the client
pub fn auth_error_to_http(error: AuthError) -> ApiError {
    let (status, message) = match error {
        AuthError::InvalidInput { message } => (StatusCode::BAD_REQUEST, message),
        rejected @ (AuthError::UsernameTaken | AuthError::InvalidCredentials) => {
            (StatusCode::BAD_REQUEST, rejected.to_string())
        }
        AuthError::Internal { message } => {
            tracing::error!("Internal error while handling request: {}", message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    };

    (status, Json(ErrorResponse::new(message)))
}

/// Converts a malformed JSON body into an invalid-input error
pub fn json_rejection_to_http(rejection: JsonRejection) -> ApiError {
    tracing::debug!("Rejected request body: {}", rejection);
    auth_error_to_http(AuthError::invalid_input(rejection.body_text()))
}

/// Converts a malformed urlencoded body into an invalid-input error
pub fn form_rejection_to_http(rejection: FormRejection) -> ApiError {
    tracing::debug!("Rejected form body: {}", rejection);
    auth_error_to_http(AuthError::invalid_input(rejection.body_text()))
}

/// Request body read as `application/x-www-form-urlencoded` when the request
/// says so, and as JSON otherwise.
#[derive(Debug, Clone)]
pub struct JsonOrForm<T>(pub T);

impl<S, T> FromRequest<S> for JsonOrForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

        if is_form {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(form_rejection_to_http)?;
            Ok(Self(value))
        } else {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(json_rejection_to_http)?;
            Ok(Self(value))
        }
    }
}

/// 401 answer used by the authentication middleware
pub fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::new("Unauthorized")),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_are_bad_request() {
        let (status, Json(body)) = auth_error_to_http(AuthError::UsernameTaken);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.message, "Username already taken");

        let (status, Json(body)) = auth_error_to_http(AuthError::InvalidCredentials);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.message, "Invalid username or password");

        let (status, Json(body)) =
            auth_error_to_http(AuthError::invalid_input("username: Username is required"));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.message, "username: Username is required");
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let (status, Json(body)) =
            auth_error_to_http(AuthError::internal("Database error: pool timed out"));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.message, "Internal server error");
    }

    #[test]
    fn test_unauthorized_status() {
        assert_eq!(unauthorized().status(), StatusCode::UNAUTHORIZED);
    }
}
