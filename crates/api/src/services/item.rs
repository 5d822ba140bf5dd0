//! Course items: visibility, creation, tree moves, submissions and deletion.

use euclid_database::{
    Course, CourseItem, ItemKind, NewCourseItem, NewItemContent, Repositories, User,
};
use euclid_identity::Identifier;
use tracing::info;

use super::course::{get_course, require_membership};
use super::error::ServiceError;
use crate::routes::models::{CreateItemForm, MoveItemForm, SubmissionForm};
use crate::util::optional_form_id;
use crate::validation::validate_name;

const NO_SUCH_ITEM: &str = "No such item exists.";

/// What the caller may see inside one course.
#[derive(Debug, Clone)]
pub struct CourseAccess {
    user_id: Identifier,
    is_course_creator: bool,
    priority: i64,
}

impl CourseAccess {
    /// Resolve the caller's standing in `course`; non-members are refused.
    pub async fn resolve(
        repos: &Repositories,
        course: &Course,
        user: &User,
    ) -> Result<Self, ServiceError> {
        let member = require_membership(repos, course, user).await?;
        let priority = repos.members.effective_priority(&member.id).await?;

        Ok(Self {
            user_id: user.id,
            is_course_creator: course.creator_id == user.id,
            priority,
        })
    }

    pub fn can_see(&self, item: &CourseItem) -> bool {
        self.is_course_creator
            || item.creator_id == self.user_id
            || self.priority >= item.visible_role
    }

    pub fn can_delete(&self, item: &CourseItem) -> bool {
        self.is_course_creator || item.creator_id == self.user_id
    }
}

/// An item together with the caller's access to its course.
async fn load_visible(
    repos: &Repositories,
    caller: &User,
    item_id: &Identifier,
) -> Result<(CourseItem, CourseAccess), ServiceError> {
    let item = repos
        .items
        .find_by_id(item_id)
        .await?
        .ok_or_else(|| ServiceError::not_found(NO_SUCH_ITEM))?;
    let course = get_course(repos, &item.course_id).await?;
    let access = CourseAccess::resolve(repos, &course, caller).await?;

    if !access.can_see(&item) {
        return Err(ServiceError::not_found(NO_SUCH_ITEM));
    }

    Ok((item, access))
}

pub async fn list_items(
    repos: &Repositories,
    caller: &User,
    course_id: &Identifier,
) -> Result<Vec<CourseItem>, ServiceError> {
    let course = get_course(repos, course_id).await?;
    let access = CourseAccess::resolve(repos, &course, caller).await?;

    let items = repos.items.list_by_course(&course.id).await?;
    Ok(items.into_iter().filter(|item| access.can_see(item)).collect())
}

pub async fn create_item(
    repos: &Repositories,
    caller: &User,
    course_id: &Identifier,
    kind: ItemKind,
    form: CreateItemForm,
) -> Result<CourseItem, ServiceError> {
    let course = get_course(repos, course_id).await?;
    let access = CourseAccess::resolve(repos, &course, caller).await?;

    validate_name("Item name", &form.name, 100)?;
    let parent_id = optional_form_id("parent", form.parent.as_deref())?;

    let content = match kind {
        ItemKind::Page => NewItemContent::Page,
        ItemKind::Assignment => {
            let number_of_problems = form.number_of_problems.ok_or_else(|| {
                ServiceError::bad_request("Assignments require number_of_problems.")
            })?;
            if number_of_problems < 0 {
                return Err(ServiceError::bad_request(
                    "Number of problems cannot be negative.",
                ));
            }
            NewItemContent::Assignment { number_of_problems }
        }
    };

    if let Some(parent_id) = &parent_id {
        let parent = repos
            .items
            .find_by_id(parent_id)
            .await?
            .filter(|parent| access.can_see(parent))
            .ok_or_else(|| ServiceError::bad_request("No such parent item exists."))?;
        if parent.course_id != course.id {
            return Err(ServiceError::bad_request(
                "Parent belongs to a different course.",
            ));
        }
    }

    let item = repos
        .items
        .create(&NewCourseItem {
            course_id: course.id,
            creator_id: caller.id,
            name: form.name.trim().to_string(),
            visible_role: form.visible_role,
            parent_id,
            content,
        })
        .await?;

    info!(item = %item.id, course = %course.id, kind = item.kind().as_str(), "course item created");
    Ok(item)
}

/// The item and the ids of its children visible to the caller.
pub async fn get_item(
    repos: &Repositories,
    caller: &User,
    item_id: &Identifier,
) -> Result<(CourseItem, Vec<Identifier>), ServiceError> {
    let (item, access) = load_visible(repos, caller, item_id).await?;

    let mut children = Vec::new();
    for child_id in repos.items.children_ids(&item.id).await? {
        if let Some(child) = repos.items.find_by_id(&child_id).await? {
            if access.can_see(&child) {
                children.push(child.id);
            }
        }
    }

    Ok((item, children))
}

pub async fn move_item(
    repos: &Repositories,
    caller: &User,
    item_id: &Identifier,
    form: MoveItemForm,
) -> Result<CourseItem, ServiceError> {
    let (item, access) = load_visible(repos, caller, item_id).await?;
    if !access.can_delete(&item) {
        return Err(ServiceError::forbidden(
            "Only the item or course creator may move this item.",
        ));
    }

    let parent_id = optional_form_id("parent", form.parent.as_deref())?;
    if let Some(parent_id) = &parent_id {
        repos
            .items
            .find_by_id(parent_id)
            .await?
            .filter(|parent| access.can_see(parent))
            .ok_or_else(|| ServiceError::bad_request("No such parent item exists."))?;
    }

    let moved = repos.items.set_parent(&item.id, parent_id.as_ref()).await?;

    info!(item = %moved.id, parent = ?moved.parent_id.map(|p| p.encode()), "course item moved");
    Ok(moved)
}

pub async fn submit(
    repos: &Repositories,
    caller: &User,
    item_id: &Identifier,
    form: SubmissionForm,
) -> Result<CourseItem, ServiceError> {
    let (item, _) = load_visible(repos, caller, item_id).await?;

    if !form.grade.is_finite() || form.grade < 0.0 {
        return Err(ServiceError::bad_request(
            "Grade must be a non-negative number.",
        ));
    }

    Ok(repos.items.record_submission(&item.id, form.grade).await?)
}

pub async fn delete_item(
    repos: &Repositories,
    caller: &User,
    item_id: &Identifier,
) -> Result<(), ServiceError> {
    let (item, access) = load_visible(repos, caller, item_id).await?;
    if !access.can_delete(&item) {
        return Err(ServiceError::forbidden(
            "Only the item or course creator may delete this item.",
        ));
    }

    repos.items.delete(&item.id).await?;
    info!(item = %item.id, "course item deleted");
    Ok(())
}
