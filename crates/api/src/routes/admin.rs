use axum::{extract::State, Json};

use crate::{
    extract::AdminUser, routes::models::StatsResponse, services::admin as admin_service, ApiError,
    AppState,
};

#[utoipa::path(
    get,
    path = "/admin/stats",
    tag = "Admin",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Entity counts", body = StatsResponse),
        (status = 403, description = "ADMIN authority required", body = crate::error::ErrorResponse)
    )
)]
pub async fn stats(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<StatsResponse>, ApiError> {
    Ok(Json(admin_service::stats(state.repositories()).await?))
}
