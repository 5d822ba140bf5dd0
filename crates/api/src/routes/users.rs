use axum::{
    extract::{Path, State},
    http::StatusCode,
    Form, Json,
};

use crate::{
    extract::{CurrentUser, SessionOwner},
    links::{self, Links},
    routes::models::{
        CourseCollection, CourseModel, CreateUserForm, CreatedResponse, DeleteUserForm,
        MessageResponse, UpdateUserForm, UserCollection, UserModel,
    },
    services::user as user_service,
    util::path_id,
    ApiError, AppState,
};

#[utoipa::path(
    get,
    path = "/internal/users",
    tag = "Users",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "All users", body = UserCollection),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    _caller: CurrentUser,
) -> Result<Json<UserCollection>, ApiError> {
    let users = user_service::list_users(state.repositories()).await?;

    Ok(Json(UserCollection::new(
        users.iter().map(UserModel::from).collect(),
        Links::new().with("self", links::USERS),
    )))
}

#[utoipa::path(
    get,
    path = "/internal/user/{id}",
    tag = "Users",
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "Encoded user identifier")),
    responses(
        (status = 200, description = "The user", body = UserModel),
        (status = 404, description = "No such user", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    _caller: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<UserModel>, ApiError> {
    let id = path_id(&id)?;
    let user = user_service::get_user(state.repositories(), &id).await?;

    Ok(Json(UserModel::from(&user)))
}

#[utoipa::path(
    get,
    path = "/internal/user/{id}/courses",
    tag = "Users",
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "Encoded user identifier")),
    responses(
        (status = 200, description = "Courses the user is a member of", body = CourseCollection),
        (status = 404, description = "No such user", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_user_courses(
    State(state): State<AppState>,
    _caller: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<CourseCollection>, ApiError> {
    let id = path_id(&id)?;
    let courses = user_service::user_courses(state.repositories(), &id).await?;

    Ok(Json(CourseCollection::new(
        courses.iter().map(CourseModel::from).collect(),
        Links::new()
            .with("self", links::user_courses(&id))
            .with("user", links::user(&id)),
    )))
}

#[utoipa::path(
    post,
    path = "/internal/users/create",
    tag = "Users",
    request_body(content = CreateUserForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 201, description = "User registered", body = CreatedResponse),
        (status = 400, description = "Invalid registration form", body = crate::error::ErrorResponse),
        (status = 409, description = "Username or email already taken", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    Form(form): Form<CreateUserForm>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let user = user_service::create_user(state.authenticator(), form).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id: user.id.encode(),
            links: Links::new().with("self", links::user(&user.id)),
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/internal/users/update",
    tag = "Users",
    security(("bearerAuth" = [])),
    request_body(content = UpdateUserForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Updated user", body = UserModel),
        (status = 400, description = "Invalid form or inaccessible account", body = crate::error::ErrorResponse),
        (status = 403, description = "Not the caller's account", body = crate::error::ErrorResponse),
        (status = 409, description = "Username or email already taken", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    SessionOwner(caller): SessionOwner,
    Form(form): Form<UpdateUserForm>,
) -> Result<Json<UserModel>, ApiError> {
    let user = user_service::update_user(state.repositories(), &caller, form).await?;

    Ok(Json(UserModel::from(&user)))
}

#[utoipa::path(
    delete,
    path = "/internal/users/delete",
    tag = "Users",
    security(("bearerAuth" = [])),
    request_body(content = DeleteUserForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 400, description = "Unknown user or wrong credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    _caller: CurrentUser,
    Form(form): Form<DeleteUserForm>,
) -> Result<Json<MessageResponse>, ApiError> {
    user_service::delete_user(state.repositories(), form).await?;

    Ok(Json(MessageResponse {
        message: "User deleted.".to_string(),
    }))
}
