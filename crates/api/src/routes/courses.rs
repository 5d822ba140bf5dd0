use axum::{
    extract::{Path, State},
    http::StatusCode,
    Form, Json,
};

use crate::{
    extract::CurrentUser,
    links::{self, Links},
    routes::models::{
        CourseCollection, CourseModel, CreateCourseForm, CreatedResponse, MemberCollection,
        MemberModel, MessageResponse, NicknameForm,
    },
    services::course as course_service,
    util::path_id,
    ApiError, AppState,
};

#[utoipa::path(
    get,
    path = "/internal/courses",
    tag = "Courses",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "All courses", body = CourseCollection),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_courses(
    State(state): State<AppState>,
    _caller: CurrentUser,
) -> Result<Json<CourseCollection>, ApiError> {
    let courses = course_service::list_courses(state.repositories()).await?;

    Ok(Json(CourseCollection::new(
        courses.iter().map(CourseModel::from).collect(),
        Links::new().with("self", links::COURSES),
    )))
}

#[utoipa::path(
    get,
    path = "/internal/course/{id}",
    tag = "Courses",
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "Encoded course identifier")),
    responses(
        (status = 200, description = "The course", body = CourseModel),
        (status = 404, description = "No such course", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_course(
    State(state): State<AppState>,
    _caller: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<CourseModel>, ApiError> {
    let id = path_id(&id)?;
    let course = course_service::get_course(state.repositories(), &id).await?;

    Ok(Json(CourseModel::from(&course)))
}

#[utoipa::path(
    post,
    path = "/internal/course/create",
    tag = "Courses",
    security(("bearerAuth" = [])),
    request_body(content = CreateCourseForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 201, description = "Course created with its creator enrolled", body = CreatedResponse),
        (status = 400, description = "Invalid course form", body = crate::error::ErrorResponse),
        (status = 403, description = "Creator is not the caller", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_course(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Form(form): Form<CreateCourseForm>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let (course, _) = course_service::create_course(state.repositories(), &caller, form).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id: course.id.encode(),
            links: Links::new()
                .with("self", links::course(&course.id))
                .with("members", links::course_members(&course.id)),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/internal/course/{id}/members",
    tag = "Course Members",
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "Encoded course identifier")),
    responses(
        (status = 200, description = "Members of the course", body = MemberCollection),
        (status = 404, description = "No such course", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_members(
    State(state): State<AppState>,
    _caller: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MemberCollection>, ApiError> {
    let id = path_id(&id)?;
    let members = course_service::list_members(state.repositories(), &id).await?;

    Ok(Json(MemberCollection::new(
        members.iter().map(MemberModel::from).collect(),
        Links::new()
            .with("self", links::course_members(&id))
            .with("course", links::course(&id)),
    )))
}

#[utoipa::path(
    post,
    path = "/internal/course/{id}/join",
    tag = "Course Members",
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "Encoded course identifier")),
    request_body(content = NicknameForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 201, description = "Joined the course", body = MemberModel),
        (status = 404, description = "No such course", body = crate::error::ErrorResponse),
        (status = 409, description = "Already a member", body = crate::error::ErrorResponse)
    )
)]
pub async fn join_course(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<String>,
    form: Option<Form<NicknameForm>>,
) -> Result<(StatusCode, Json<MemberModel>), ApiError> {
    let id = path_id(&id)?;
    let nickname = form.and_then(|Form(form)| form.nickname);
    let member = course_service::join_course(state.repositories(), &caller, &id, nickname).await?;

    Ok((StatusCode::CREATED, Json(MemberModel::from(&member))))
}

#[utoipa::path(
    delete,
    path = "/internal/course/{id}/leave",
    tag = "Course Members",
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "Encoded course identifier")),
    responses(
        (status = 200, description = "Left the course", body = MessageResponse),
        (status = 400, description = "Creator cannot leave, or not a member", body = crate::error::ErrorResponse),
        (status = 404, description = "No such course", body = crate::error::ErrorResponse)
    )
)]
pub async fn leave_course(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = path_id(&id)?;
    course_service::leave_course(state.repositories(), &caller, &id).await?;

    Ok(Json(MessageResponse {
        message: "Left the course.".to_string(),
    }))
}

#[utoipa::path(
    put,
    path = "/internal/course/{id}/nickname",
    tag = "Course Members",
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "Encoded course identifier")),
    request_body(content = NicknameForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Updated membership", body = MemberModel),
        (status = 403, description = "Not a member", body = crate::error::ErrorResponse),
        (status = 404, description = "No such course", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_nickname(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<String>,
    Form(form): Form<NicknameForm>,
) -> Result<Json<MemberModel>, ApiError> {
    let id = path_id(&id)?;
    let member =
        course_service::update_nickname(state.repositories(), &caller, &id, form.nickname).await?;

    Ok(Json(MemberModel::from(&member)))
}
