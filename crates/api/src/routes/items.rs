use axum::{
    extract::{Path, State},
    http::StatusCode,
    Form, Json,
};
use euclid_database::{ItemKind, User};

use crate::{
    extract::CurrentUser,
    links::{self, Links},
    routes::models::{
        CreateItemForm, ItemCollection, ItemModel, MessageResponse, MoveItemForm, SubmissionForm,
    },
    services::item as item_service,
    util::path_id,
    ApiError, AppState,
};

#[utoipa::path(
    get,
    path = "/internal/course/{id}/items",
    tag = "Course Items",
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "Encoded course identifier")),
    responses(
        (status = 200, description = "Items visible to the caller", body = ItemCollection),
        (status = 403, description = "Not a member", body = crate::error::ErrorResponse),
        (status = 404, description = "No such course", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_items(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ItemCollection>, ApiError> {
    let id = path_id(&id)?;
    let items = item_service::list_items(state.repositories(), &caller, &id).await?;

    Ok(Json(ItemCollection::new(
        items.iter().map(ItemModel::from).collect(),
        Links::new()
            .with("self", links::course_items(&id))
            .with("course", links::course(&id)),
    )))
}

async fn create(
    state: AppState,
    caller: &User,
    raw_id: &str,
    kind: ItemKind,
    form: CreateItemForm,
) -> Result<(StatusCode, Json<ItemModel>), ApiError> {
    let id = path_id(raw_id)?;
    let item = item_service::create_item(state.repositories(), caller, &id, kind, form).await?;

    Ok((StatusCode::CREATED, Json(ItemModel::from(&item))))
}

#[utoipa::path(
    post,
    path = "/internal/course/{id}/pages",
    tag = "Course Items",
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "Encoded course identifier")),
    request_body(content = CreateItemForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 201, description = "Page created", body = ItemModel),
        (status = 400, description = "Invalid item form", body = crate::error::ErrorResponse),
        (status = 403, description = "Not a member", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_page(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<String>,
    Form(form): Form<CreateItemForm>,
) -> Result<(StatusCode, Json<ItemModel>), ApiError> {
    create(state, &caller, &id, ItemKind::Page, form).await
}

#[utoipa::path(
    post,
    path = "/internal/course/{id}/assignments",
    tag = "Course Items",
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "Encoded course identifier")),
    request_body(content = CreateItemForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 201, description = "Assignment created", body = ItemModel),
        (status = 400, description = "Invalid item form", body = crate::error::ErrorResponse),
        (status = 403, description = "Not a member", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_assignment(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<String>,
    Form(form): Form<CreateItemForm>,
) -> Result<(StatusCode, Json<ItemModel>), ApiError> {
    create(state, &caller, &id, ItemKind::Assignment, form).await
}

#[utoipa::path(
    get,
    path = "/internal/item/{id}",
    tag = "Course Items",
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "Encoded item identifier")),
    responses(
        (status = 200, description = "The item with its visible children", body = ItemModel),
        (status = 403, description = "Not a member of the item's course", body = crate::error::ErrorResponse),
        (status = 404, description = "No such item, or not visible", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_item(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ItemModel>, ApiError> {
    let id = path_id(&id)?;
    let (item, children) = item_service::get_item(state.repositories(), &caller, &id).await?;

    let mut model = ItemModel::from(&item);
    model.children = Some(children.iter().map(|child| child.encode()).collect());
    Ok(Json(model))
}

#[utoipa::path(
    put,
    path = "/internal/item/{id}/parent",
    tag = "Course Items",
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "Encoded item identifier")),
    request_body(content = MoveItemForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Item moved", body = ItemModel),
        (status = 400, description = "Move would create a cycle or cross courses", body = crate::error::ErrorResponse),
        (status = 404, description = "No such item", body = crate::error::ErrorResponse)
    )
)]
pub async fn move_item(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<String>,
    form: Option<Form<MoveItemForm>>,
) -> Result<Json<ItemModel>, ApiError> {
    let id = path_id(&id)?;
    let form = form.map(|Form(form)| form).unwrap_or_default();
    let item = item_service::move_item(state.repositories(), &caller, &id, form).await?;

    Ok(Json(ItemModel::from(&item)))
}

#[utoipa::path(
    post,
    path = "/internal/item/{id}/submissions",
    tag = "Course Items",
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "Encoded item identifier")),
    request_body(content = SubmissionForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Submission recorded", body = ItemModel),
        (status = 400, description = "Not an assignment, or invalid grade", body = crate::error::ErrorResponse),
        (status = 404, description = "No such item", body = crate::error::ErrorResponse)
    )
)]
pub async fn submit(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<String>,
    Form(form): Form<SubmissionForm>,
) -> Result<Json<ItemModel>, ApiError> {
    let id = path_id(&id)?;
    let item = item_service::submit(state.repositories(), &caller, &id, form).await?;

    Ok(Json(ItemModel::from(&item)))
}

#[utoipa::path(
    delete,
    path = "/internal/item/{id}",
    tag = "Course Items",
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "Encoded item identifier")),
    responses(
        (status = 200, description = "Item deleted; children moved up", body = MessageResponse),
        (status = 403, description = "Not the item or course creator", body = crate::error::ErrorResponse),
        (status = 404, description = "No such item", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_item(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = path_id(&id)?;
    item_service::delete_item(state.repositories(), &caller, &id).await?;

    Ok(Json(MessageResponse {
        message: "Item deleted.".to_string(),
    }))
}
