use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use euclid_auth::AuthError;
use euclid_identity::DecodeError;
use serde::Serialize;
use tracing::{error, warn};
use utoipa::ToSchema;

pub const ACCOUNT_INACCESSIBLE: &str =
    "Account is inaccessible (locked, credentials expired, account expired, or disabled).";

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// An identifier in the URL path that does not decode names nothing.
    pub fn undecodable_path_id(raw: &str, error: &DecodeError) -> Self {
        warn!(id = raw, %error, "undecodable identifier in path");
        Self::not_found("Resource not found")
    }

    /// An identifier submitted in a form that does not decode is invalid input.
    pub fn undecodable_form_id(field: &str, raw: &str, error: &DecodeError) -> Self {
        warn!(field, id = raw, %error, "undecodable identifier in form");
        Self::bad_request(format!("Invalid identifier for {field}."))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        let status = match error {
            AuthError::InvalidCredentials
            | AuthError::SessionNotFound
            | AuthError::SessionExpired
            | AuthError::InvalidSession => StatusCode::UNAUTHORIZED,
            AuthError::AccountInaccessible => {
                return Self::bad_request(ACCOUNT_INACCESSIBLE);
            }
            AuthError::UsernameTaken => return Self::conflict("Username already exists."),
            AuthError::EmailTaken => {
                return Self::conflict("User with given email already exists.");
            }
            AuthError::Database(_)
            | AuthError::Repository(_)
            | AuthError::PasswordHash(_)
            | AuthError::Entropy(_) => {
                error!(error = ?error, "auth error");
                return Self::internal_server_error("Authentication backend failure");
            }
        };
        Self::new(status, error.to_string())
    }
}
