use euclid_database::{Course, CourseUser, NewCourse, Repositories, User};
use euclid_identity::Identifier;
use tracing::info;

use super::error::ServiceError;
use crate::routes::models::CreateCourseForm;
use crate::util::form_id;
use crate::validation::validate_name;

const NO_SUCH_COURSE: &str = "No such course exists.";
const NOT_A_MEMBER: &str = "You are not a member of this course.";

pub async fn list_courses(repos: &Repositories) -> Result<Vec<Course>, ServiceError> {
    Ok(repos.courses.list().await?)
}

pub async fn get_course(repos: &Repositories, id: &Identifier) -> Result<Course, ServiceError> {
    repos
        .courses
        .find_by_id(id)
        .await?
        .ok_or_else(|| ServiceError::not_found(NO_SUCH_COURSE))
}

/// The caller's membership in `course`, or 403.
pub async fn require_membership(
    repos: &Repositories,
    course: &Course,
    user: &User,
) -> Result<CourseUser, ServiceError> {
    repos
        .members
        .find(&course.id, &user.id)
        .await?
        .ok_or_else(|| ServiceError::forbidden(NOT_A_MEMBER))
}

pub fn require_creator(course: &Course, user: &User) -> Result<(), ServiceError> {
    if course.creator_id != user.id {
        return Err(ServiceError::forbidden(
            "Only the course creator may perform this action.",
        ));
    }
    Ok(())
}

/// Create a course owned by the caller, who becomes its first member.
pub async fn create_course(
    repos: &Repositories,
    caller: &User,
    form: CreateCourseForm,
) -> Result<(Course, CourseUser), ServiceError> {
    let creator_id = form_id("id", &form.id)?;
    if creator_id != caller.id {
        return Err(ServiceError::forbidden(
            "Courses can only be created on behalf of yourself.",
        ));
    }

    validate_name("Course name", &form.name, 100)?;
    if form.description.chars().count() > 2000 {
        return Err(ServiceError::bad_request(
            "Description must be at most 2000 characters long.",
        ));
    }

    let (course, member) = repos
        .courses
        .create(
            &NewCourse {
                creator_id,
                name: form.name.trim().to_string(),
                description: form.description,
            },
            &caller.display_name,
        )
        .await?;

    info!(course = %course.id, creator = %caller.id, "course created");
    Ok((course, member))
}

pub async fn list_members(
    repos: &Repositories,
    course_id: &Identifier,
) -> Result<Vec<CourseUser>, ServiceError> {
    let course = get_course(repos, course_id).await?;
    Ok(repos.members.list_by_course(&course.id).await?)
}

fn resolve_nickname(user: &User, nickname: Option<String>) -> Result<String, ServiceError> {
    match nickname.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
        Some(nickname) => {
            validate_name("Nickname", &nickname, 50)?;
            Ok(nickname)
        }
        None => Ok(user.display_name.clone()),
    }
}

pub async fn join_course(
    repos: &Repositories,
    caller: &User,
    course_id: &Identifier,
    nickname: Option<String>,
) -> Result<CourseUser, ServiceError> {
    let course = get_course(repos, course_id).await?;
    let nickname = resolve_nickname(caller, nickname)?;

    let member = repos.members.add(&course.id, &caller.id, &nickname).await?;
    info!(course = %course.id, user = %caller.id, "user joined course");
    Ok(member)
}

pub async fn leave_course(
    repos: &Repositories,
    caller: &User,
    course_id: &Identifier,
) -> Result<(), ServiceError> {
    let course = get_course(repos, course_id).await?;
    if course.creator_id == caller.id {
        return Err(ServiceError::bad_request(
            "The course creator cannot leave the course.",
        ));
    }

    let member = repos
        .members
        .find(&course.id, &caller.id)
        .await?
        .ok_or_else(|| ServiceError::bad_request(NOT_A_MEMBER))?;

    repos.members.remove(&member.id).await?;
    info!(course = %course.id, user = %caller.id, "user left course");
    Ok(())
}

pub async fn update_nickname(
    repos: &Repositories,
    caller: &User,
    course_id: &Identifier,
    nickname: Option<String>,
) -> Result<CourseUser, ServiceError> {
    let course = get_course(repos, course_id).await?;
    let member = require_membership(repos, &course, caller).await?;
    let nickname = resolve_nickname(caller, nickname)?;

    Ok(repos.members.update_nickname(&member.id, &nickname).await?)
}
