use axum::{
    extract::{Path, State},
    http::StatusCode,
    Form, Json,
};

use crate::{
    extract::CurrentUser,
    links::{self, Links},
    routes::models::{AssignRoleForm, CreateRoleForm, MessageResponse, RoleCollection, RoleModel},
    services::role as role_service,
    util::path_id,
    ApiError, AppState,
};

#[utoipa::path(
    get,
    path = "/internal/course/{id}/roles",
    tag = "Roles",
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "Encoded course identifier")),
    responses(
        (status = 200, description = "Roles, highest priority first", body = RoleCollection),
        (status = 404, description = "No such course", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_roles(
    State(state): State<AppState>,
    _caller: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<RoleCollection>, ApiError> {
    let id = path_id(&id)?;
    let roles = role_service::list_roles(state.repositories(), &id).await?;

    Ok(Json(RoleCollection::new(
        roles.iter().map(RoleModel::from).collect(),
        Links::new()
            .with("self", links::course_roles(&id))
            .with("course", links::course(&id)),
    )))
}

#[utoipa::path(
    post,
    path = "/internal/course/{id}/roles",
    tag = "Roles",
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "Encoded course identifier")),
    request_body(content = CreateRoleForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 201, description = "Role created", body = RoleModel),
        (status = 400, description = "Invalid role form", body = crate::error::ErrorResponse),
        (status = 403, description = "Caller is not the course creator", body = crate::error::ErrorResponse),
        (status = 409, description = "Role name already used in this course", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_role(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<String>,
    Form(form): Form<CreateRoleForm>,
) -> Result<(StatusCode, Json<RoleModel>), ApiError> {
    let id = path_id(&id)?;
    let role = role_service::create_role(state.repositories(), &caller, &id, form).await?;

    Ok((StatusCode::CREATED, Json(RoleModel::from(&role))))
}

#[utoipa::path(
    post,
    path = "/internal/course/{id}/roles/{role_id}/assign",
    tag = "Roles",
    security(("bearerAuth" = [])),
    params(
        ("id" = String, Path, description = "Encoded course identifier"),
        ("role_id" = String, Path, description = "Encoded role identifier")
    ),
    request_body(content = AssignRoleForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Role assigned", body = MessageResponse),
        (status = 400, description = "Unknown member", body = crate::error::ErrorResponse),
        (status = 403, description = "Caller is not the course creator", body = crate::error::ErrorResponse),
        (status = 404, description = "No such course or role", body = crate::error::ErrorResponse)
    )
)]
pub async fn assign_role(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path((id, role_id)): Path<(String, String)>,
    Form(form): Form<AssignRoleForm>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = path_id(&id)?;
    let role_id = path_id(&role_id)?;
    let role = role_service::assign_role(state.repositories(), &caller, &id, &role_id, form).await?;

    Ok(Json(MessageResponse {
        message: format!("Role {} assigned.", role.name),
    }))
}
