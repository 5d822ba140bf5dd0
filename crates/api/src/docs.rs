use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health_check,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::users::list_users,
        crate::routes::users::get_user,
        crate::routes::users::get_user_courses,
        crate::routes::users::create_user,
        crate::routes::users::update_user,
        crate::routes::users::delete_user,
        crate::routes::courses::list_courses,
        crate::routes::courses::get_course,
        crate::routes::courses::create_course,
        crate::routes::courses::list_members,
        crate::routes::courses::join_course,
        crate::routes::courses::leave_course,
        crate::routes::courses::update_nickname,
        crate::routes::roles::list_roles,
        crate::routes::roles::create_role,
        crate::routes::roles::assign_role,
        crate::routes::items::list_items,
        crate::routes::items::create_page,
        crate::routes::items::create_assignment,
        crate::routes::items::get_item,
        crate::routes::items::move_item,
        crate::routes::items::submit,
        crate::routes::items::delete_item,
        crate::routes::admin::stats
    ),
    components(
        schemas(
            crate::error::ErrorResponse,
            crate::links::Link,
            crate::links::Links,
            crate::routes::health::HealthResponse,
            crate::routes::auth::SessionResponse,
            crate::routes::models::UserModel,
            crate::routes::models::CourseModel,
            crate::routes::models::MemberModel,
            crate::routes::models::RoleModel,
            crate::routes::models::ItemModel,
            crate::routes::models::UserCollection,
            crate::routes::models::EmbeddedUsers,
            crate::routes::models::CourseCollection,
            crate::routes::models::EmbeddedCourses,
            crate::routes::models::MemberCollection,
            crate::routes::models::EmbeddedMembers,
            crate::routes::models::RoleCollection,
            crate::routes::models::EmbeddedRoles,
            crate::routes::models::ItemCollection,
            crate::routes::models::EmbeddedItems,
            crate::routes::models::MessageResponse,
            crate::routes::models::CreatedResponse,
            crate::routes::models::StatsResponse,
            crate::routes::models::LoginForm,
            crate::routes::models::CreateUserForm,
            crate::routes::models::UpdateUserForm,
            crate::routes::models::DeleteUserForm,
            crate::routes::models::CreateCourseForm,
            crate::routes::models::NicknameForm,
            crate::routes::models::CreateRoleForm,
            crate::routes::models::AssignRoleForm,
            crate::routes::models::CreateItemForm,
            crate::routes::models::MoveItemForm,
            crate::routes::models::SubmissionForm
        )
    ),
    tags(
        (name = "Health", description = "Service health endpoints"),
        (name = "Auth", description = "Form login and session management"),
        (name = "Users", description = "User accounts"),
        (name = "Courses", description = "Course management"),
        (name = "Course Members", description = "Joining, leaving and nicknames"),
        (name = "Roles", description = "Course roles and their assignment"),
        (name = "Course Items", description = "Pages and assignments"),
        (name = "Admin", description = "Administrative statistics")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        let schemes = &mut components.security_schemes;

        let mut scheme = SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer));
        if let SecurityScheme::Http(http) = &mut scheme {
            http.bearer_format = Some("Bearer".to_string());
        }

        schemes.insert("bearerAuth".to_string(), scheme);
    }
}
