use axum::{extract::State, http::HeaderMap, Form, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use euclid_auth::AuthSession;
use euclid_database::User;
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::{
    routes::models::{LoginForm, MessageResponse, UserModel},
    util::session_token,
    ApiError, AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub token: String,
    pub user: UserModel,
    pub expires_at: String,
}

impl SessionResponse {
    pub fn new(session: &AuthSession, user: &User) -> Self {
        Self {
            token: session.token.clone(),
            user: UserModel::from(user),
            expires_at: session.expires_at.to_rfc3339(),
        }
    }
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Session issued; also set as an HttpOnly cookie", body = SessionResponse),
        (status = 400, description = "Account is inaccessible", body = crate::error::ErrorResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(CookieJar, Json<SessionResponse>), ApiError> {
    let (user, session) = state
        .authenticator()
        .login_with_password(form.username.trim(), &form.password)
        .await?;

    let cookie = Cookie::build((state.session_cookie().to_string(), session.token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    info!(user = %user.id, "user logged in");
    Ok((jar.add(cookie), Json(SessionResponse::new(&session, &user))))
}

#[utoipa::path(
    post,
    path = "/logout",
    tag = "Auth",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Session revoked", body = MessageResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), ApiError> {
    let token = session_token(&headers, state.session_cookie())?;
    let (user, session) = state.authenticate(&token).await?;
    state.authenticator().revoke_session(&session.token).await?;
    info!(user = %user.id, "user logged out");

    let cookie = Cookie::build((state.session_cookie().to_string(), "")).path("/");
    Ok((
        jar.remove(cookie),
        Json(MessageResponse {
            message: "Logged out.".to_string(),
        }),
    ))
}
