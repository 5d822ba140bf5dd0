use euclid_auth::AuthError;
use euclid_database::DatabaseError;
use thiserror::Error;

use crate::ApiError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Database(DatabaseError),
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ServiceError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(what) => Self::NotFound(format!("No such {what} exists.")),
            DatabaseError::UsernameTaken => Self::Conflict("Username already exists.".into()),
            DatabaseError::EmailTaken => {
                Self::Conflict("User with given email already exists.".into())
            }
            DatabaseError::Duplicate("membership") => {
                Self::Conflict("User is already a member of this course.".into())
            }
            DatabaseError::Duplicate(what) => Self::Conflict(format!("The {what} already exists.")),
            DatabaseError::InvalidHierarchy(reason) | DatabaseError::Unsupported(reason) => {
                Self::BadRequest(capitalise(reason))
            }
            other => Self::Database(other),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(msg) => ApiError::not_found(msg),
            ServiceError::Forbidden(msg) => ApiError::forbidden(msg),
            ServiceError::BadRequest(msg) => ApiError::bad_request(msg),
            ServiceError::Conflict(msg) => ApiError::conflict(msg),
            ServiceError::Database(db_err) => {
                tracing::error!("Database error: {}", db_err);
                ApiError::internal_server_error("Database operation failed")
            }
            ServiceError::Auth(auth_err) => ApiError::from(auth_err),
            ServiceError::Api(api_err) => api_err,
        }
    }
}

fn capitalise(reason: &str) -> String {
    let mut chars = reason.chars();
    match chars.next() {
        Some(first) => format!("{}{}.", first.to_uppercase(), chars.as_str()),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn uniqueness_violations_become_conflicts() {
        let api: ApiError = ServiceError::from(DatabaseError::UsernameTaken).into();
        assert_eq!(api.status, StatusCode::CONFLICT);
        assert_eq!(api.message, "Username already exists.");

        let api: ApiError = ServiceError::from(DatabaseError::Duplicate("membership")).into();
        assert_eq!(api.status, StatusCode::CONFLICT);
    }

    #[test]
    fn hierarchy_errors_are_bad_requests() {
        let api: ApiError = ServiceError::from(DatabaseError::InvalidHierarchy(
            "an item cannot become its own descendant",
        ))
        .into();
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.message, "An item cannot become its own descendant.");
    }

    #[test]
    fn entropy_failures_are_internal_errors() {
        let failure = euclid_identity::EntropySourceUnavailable::from(rand::Error::new(
            std::io::Error::other("no entropy"),
        ));
        let api: ApiError = ServiceError::from(DatabaseError::Entropy(failure)).into();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
