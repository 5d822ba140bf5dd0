//! Request guards for authenticated routes.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use euclid_auth::AuthError;
use euclid_database::{User, AUTHORITY_ADMIN, AUTHORITY_USER};
use tracing::debug;

use crate::util::session_token;
use crate::{ApiError, AppState};

/// The authenticated caller of an `/internal` route; requires the `USER` authority.
pub struct CurrentUser(pub User);

/// The authenticated caller of an `/admin` route; requires the `ADMIN` authority.
pub struct AdminUser(pub User);

/// The session owner of an `/internal` route whose account may be inaccessible.
/// Lets the account-update service report the account status itself.
pub struct SessionOwner(pub User);

fn require_authority(user: User, authority: &str) -> Result<User, ApiError> {
    if !user.has_authority(authority) {
        debug!(user = %user.id, authority, "missing authority");
        return Err(ApiError::forbidden("Access denied"));
    }

    Ok(user)
}

async fn authenticated_with(
    parts: &Parts,
    state: &AppState,
    authority: &str,
) -> Result<User, ApiError> {
    let token = session_token(&parts.headers, state.session_cookie())?;

    let user = match state.authenticator().authenticate_token(&token).await {
        Ok((user, _)) => user,
        Err(AuthError::AccountInaccessible) => {
            return Err(ApiError::unauthorized("account is inaccessible"));
        }
        Err(error) => return Err(ApiError::from(error)),
    };

    require_authority(user, authority)
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        authenticated_with(parts, state, AUTHORITY_USER).await.map(Self)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        authenticated_with(parts, state, AUTHORITY_ADMIN).await.map(Self)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for SessionOwner {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers, state.session_cookie())?;
        let (user, _) = state.authenticator().resolve_session(&token).await?;

        require_authority(user, AUTHORITY_USER).map(Self)
    }
}
