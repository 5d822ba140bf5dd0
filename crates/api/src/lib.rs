//! HTTP surface of the Euclid course backend.
//!
//! Routes under `/internal` require an authenticated `USER`, routes under
//! `/admin` an `ADMIN`. Registration, login and health checks are public.

mod error;
mod extract;
pub mod links;
mod middleware;
mod state;
mod util;
mod validation;

pub mod docs;
pub mod routes;
pub mod services;

pub use error::{ApiError, ErrorResponse};
pub use extract::{AdminUser, CurrentUser, SessionOwner};
pub use state::AppState;

use axum::{
    http::header::{AUTHORIZATION, CONTENT_TYPE},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/login", post(routes::auth::login))
        .route("/logout", post(routes::auth::logout))
        // User routes
        .route("/internal/users", get(routes::users::list_users))
        .route("/internal/users/create", post(routes::users::create_user))
        .route("/internal/users/update", put(routes::users::update_user))
        .route("/internal/users/delete", delete(routes::users::delete_user))
        .route("/internal/user/:id", get(routes::users::get_user))
        .route(
            "/internal/user/:id/courses",
            get(routes::users::get_user_courses),
        )
        // Course routes
        .route("/internal/courses", get(routes::courses::list_courses))
        .route(
            "/internal/course/create",
            post(routes::courses::create_course),
        )
        .route("/internal/course/:id", get(routes::courses::get_course))
        .route(
            "/internal/course/:id/members",
            get(routes::courses::list_members),
        )
        .route(
            "/internal/course/:id/join",
            post(routes::courses::join_course),
        )
        .route(
            "/internal/course/:id/leave",
            delete(routes::courses::leave_course),
        )
        .route(
            "/internal/course/:id/nickname",
            put(routes::courses::update_nickname),
        )
        // Role routes
        .route(
            "/internal/course/:id/roles",
            get(routes::roles::list_roles).post(routes::roles::create_role),
        )
        .route(
            "/internal/course/:id/roles/:role_id/assign",
            post(routes::roles::assign_role),
        )
        // Course item routes
        .route(
            "/internal/course/:id/items",
            get(routes::items::list_items),
        )
        .route(
            "/internal/course/:id/pages",
            post(routes::items::create_page),
        )
        .route(
            "/internal/course/:id/assignments",
            post(routes::items::create_assignment),
        )
        .route(
            "/internal/item/:id",
            get(routes::items::get_item).delete(routes::items::delete_item),
        )
        .route("/internal/item/:id/parent", put(routes::items::move_item))
        .route(
            "/internal/item/:id/submissions",
            post(routes::items::submit),
        )
        // Admin routes
        .route("/admin/stats", get(routes::admin::stats))
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .layer(axum::middleware::from_fn(middleware::logging_middleware))
        .layer(cors_layer())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}
