use euclid_database::{NewRole, Repositories, Role, User};
use euclid_identity::Identifier;
use tracing::info;

use super::course::{get_course, require_creator};
use super::error::ServiceError;
use crate::routes::models::{AssignRoleForm, CreateRoleForm};
use crate::util::form_id;
use crate::validation::{validate_color, validate_name};

/// Roles of a course, highest priority first.
pub async fn list_roles(repos: &Repositories, course_id: &Identifier) -> Result<Vec<Role>, ServiceError> {
    let course = get_course(repos, course_id).await?;
    Ok(repos.roles.list_by_course(&course.id).await?)
}

pub async fn create_role(
    repos: &Repositories,
    caller: &User,
    course_id: &Identifier,
    form: CreateRoleForm,
) -> Result<Role, ServiceError> {
    let course = get_course(repos, course_id).await?;
    require_creator(&course, caller)?;

    validate_name("Role name", &form.name, 50)?;
    let color = form
        .color
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
    if let Some(color) = &color {
        validate_color(color)?;
    }

    let role = repos
        .roles
        .create(&NewRole {
            course_id: course.id,
            name: form.name.trim().to_string(),
            color,
            priority: form.priority,
        })
        .await?;

    info!(course = %course.id, role = %role.id, priority = role.priority, "role created");
    Ok(role)
}

pub async fn assign_role(
    repos: &Repositories,
    caller: &User,
    course_id: &Identifier,
    role_id: &Identifier,
    form: AssignRoleForm,
) -> Result<Role, ServiceError> {
    let course = get_course(repos, course_id).await?;
    require_creator(&course, caller)?;

    let role = repos
        .roles
        .find_by_id(role_id)
        .await?
        .filter(|role| role.course_id == course.id)
        .ok_or_else(|| ServiceError::not_found("No such role exists."))?;

    let member_id = form_id("member", &form.member)?;
    let member = repos
        .members
        .find_by_id(&member_id)
        .await?
        .filter(|member| member.course_id == course.id)
        .ok_or_else(|| ServiceError::bad_request("No such member in this course."))?;

    repos.roles.assign(&role.id, &member.id).await?;
    info!(role = %role.id, member = %member.id, "role assigned");
    Ok(role)
}
