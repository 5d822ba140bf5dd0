use euclid_auth::{hash_password, verify_password, Authenticator, Registration};
use euclid_database::{Course, Repositories, User, UserUpdate};
use euclid_identity::Identifier;
use tracing::info;

use super::error::ServiceError;
use crate::error::ACCOUNT_INACCESSIBLE;
use crate::routes::models::{CreateUserForm, DeleteUserForm, UpdateUserForm};
use crate::util::form_id;
use crate::validation::{
    parse_birthday, validate_email, validate_name, validate_password, validate_username,
};

const NO_SUCH_USER: &str = "No such user exists.";

pub async fn list_users(repos: &Repositories) -> Result<Vec<User>, ServiceError> {
    Ok(repos.users.list().await?)
}

pub async fn get_user(repos: &Repositories, id: &Identifier) -> Result<User, ServiceError> {
    repos
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| ServiceError::not_found(NO_SUCH_USER))
}

pub async fn user_courses(repos: &Repositories, id: &Identifier) -> Result<Vec<Course>, ServiceError> {
    let user = get_user(repos, id).await?;
    Ok(repos.courses.list_for_user(&user.id).await?)
}

/// Open registration; `name` serves as both username and display name.
pub async fn create_user(
    authenticator: &Authenticator,
    form: CreateUserForm,
) -> Result<User, ServiceError> {
    let name = form.name.trim().to_string();
    validate_username(&name)?;
    validate_password(&form.password)?;
    validate_email(form.email.trim())?;
    let birthday = parse_birthday(&form.birthday)?;

    let user = authenticator
        .register_with_password(&Registration {
            display_name: name.clone(),
            username: name,
            password: form.password,
            email: form.email.trim().to_string(),
            birthday,
        })
        .await?;

    Ok(user)
}

/// Replace the caller's profile and password.
pub async fn update_user(
    repos: &Repositories,
    caller: &User,
    form: UpdateUserForm,
) -> Result<User, ServiceError> {
    let id = form_id("id", &form.id)?;
    if id != caller.id {
        return Err(ServiceError::forbidden("Users may only update their own account."));
    }

    let target = repos
        .users
        .find_by_id(&id)
        .await?
        .ok_or_else(|| ServiceError::bad_request(NO_SUCH_USER))?;
    if !target.is_accessible() {
        return Err(ServiceError::bad_request(ACCOUNT_INACCESSIBLE));
    }

    let username = form.username.trim().to_string();
    let email = form.email.trim().to_string();
    validate_name("Display name", &form.display_name, 50)?;
    validate_username(&username)?;
    validate_email(&email)?;
    validate_password(&form.password)?;

    if username != target.username && repos.users.exists_by_username(&username).await? {
        return Err(ServiceError::conflict("Username already exists."));
    }
    if email != target.email && repos.users.exists_by_email(&email).await? {
        return Err(ServiceError::conflict("User with given email already exists."));
    }

    let updated = repos
        .users
        .update(
            &target.id,
            &UserUpdate {
                display_name: form.display_name.trim().to_string(),
                username,
                email,
                password_hash: hash_password(&form.password)?,
            },
        )
        .await?;

    info!(user = %updated.id, "user updated");
    Ok(updated)
}

/// Delete an account after re-checking its email and password.
pub async fn delete_user(repos: &Repositories, form: DeleteUserForm) -> Result<(), ServiceError> {
    let id = form_id("id", &form.id)?;

    let user = repos
        .users
        .find_by_id(&id)
        .await?
        .ok_or_else(|| ServiceError::bad_request(NO_SUCH_USER))?;

    if user.email != form.email.trim() {
        return Err(ServiceError::bad_request("Incorrect mail."));
    }
    if !verify_password(&form.password, &user.password_hash)? {
        return Err(ServiceError::bad_request("Incorrect password."));
    }

    repos.users.delete(&user.id).await?;
    info!(user = %user.id, "user deleted");
    Ok(())
}
