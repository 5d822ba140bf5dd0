use std::sync::Arc;

use euclid_auth::{AuthSession, Authenticator};
use euclid_config::AuthConfig;
use euclid_database::{Repositories, User};
use sqlx::SqlitePool;

use crate::ApiError;

#[derive(Clone)]
pub struct AppState {
    authenticator: Authenticator,
    repositories: Repositories,
    session_cookie: Arc<str>,
}

impl AppState {
    pub fn new(db_pool: SqlitePool, authenticator: Authenticator, auth: &AuthConfig) -> Self {
        Self {
            repositories: Repositories::new(db_pool),
            authenticator,
            session_cookie: Arc::from(auth.session_cookie.as_str()),
        }
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub fn repositories(&self) -> &Repositories {
        &self.repositories
    }

    /// Name of the cookie carrying the session token.
    pub fn session_cookie(&self) -> &str {
        &self.session_cookie
    }

    pub async fn authenticate(&self, token: &str) -> Result<(User, AuthSession), ApiError> {
        self.authenticator
            .authenticate_token(token)
            .await
            .map_err(ApiError::from)
    }
}
