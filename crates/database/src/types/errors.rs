//! Error types for the database layer

use euclid_identity::EntropySourceUnavailable;
use thiserror::Error;

/// General database error
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    #[error("Database query error: {0}")]
    QueryError(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    MigrationError(String),

    #[error("Entity not found: {0}")]
    NotFound(&'static str),

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Email already exists")]
    EmailTaken,

    #[error("Duplicate entity: {0}")]
    Duplicate(&'static str),

    #[error("Invalid hierarchy: {0}")]
    InvalidHierarchy(&'static str),

    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),

    #[error(transparent)]
    Entropy(#[from] EntropySourceUnavailable),
}

impl DatabaseError {
    /// Translate a SQLite unique-constraint failure into a domain error.
    ///
    /// `entity` names the row kind for constraints other than the user
    /// username/email columns.
    pub(crate) fn from_unique(err: sqlx::Error, entity: &'static str) -> Self {
        let message = match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => db.message().to_string(),
            _ => return DatabaseError::QueryError(err),
        };

        if message.contains("users.username") {
            DatabaseError::UsernameTaken
        } else if message.contains("users.email") {
            DatabaseError::EmailTaken
        } else {
            DatabaseError::Duplicate(entity)
        }
    }
}
