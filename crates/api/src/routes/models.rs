//! JSON representations returned by the API.

use chrono::NaiveDate;
use euclid_database::{Course, CourseItem, CourseUser, ItemContent, Role, User};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::links::{self, Links};

#[derive(Debug, Serialize, ToSchema)]
pub struct UserModel {
    pub id: String,
    pub display_name: String,
    pub username: String,
    pub email: String,
    pub birthday: NaiveDate,
    pub authorities: Vec<String>,
    pub enabled: bool,
    pub locked: bool,
    pub account_expired: bool,
    pub credentials_expired: bool,
    #[serde(rename = "_links")]
    pub links: Links,
}

impl From<&User> for UserModel {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.encode(),
            display_name: user.display_name.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            birthday: user.birthday,
            authorities: user.authorities.iter().cloned().collect(),
            enabled: user.enabled,
            locked: user.locked,
            account_expired: user.account_expired,
            credentials_expired: user.credentials_expired,
            links: Links::new()
                .with("self", links::user(&user.id))
                .with("all", links::USERS)
                .with("courses", links::user_courses(&user.id)),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseModel {
    pub id: String,
    pub creator: String,
    pub name: String,
    pub description: String,
    pub created_at: String,
    #[serde(rename = "_links")]
    pub links: Links,
}

impl From<&Course> for CourseModel {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id.encode(),
            creator: course.creator_id.encode(),
            name: course.name.clone(),
            description: course.description.clone(),
            created_at: course.created_at.clone(),
            links: Links::new()
                .with("self", links::course(&course.id))
                .with("all", links::COURSES)
                .with("creator", links::user(&course.creator_id))
                .with("members", links::course_members(&course.id))
                .with("roles", links::course_roles(&course.id))
                .with("items", links::course_items(&course.id)),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MemberModel {
    pub id: String,
    pub course: String,
    pub user: String,
    pub nickname: String,
    pub joined_at: String,
    #[serde(rename = "_links")]
    pub links: Links,
}

impl From<&CourseUser> for MemberModel {
    fn from(member: &CourseUser) -> Self {
        Self {
            id: member.id.encode(),
            course: member.course_id.encode(),
            user: member.user_id.encode(),
            nickname: member.nickname.clone(),
            joined_at: member.joined_at.clone(),
            links: Links::new()
                .with("course", links::course(&member.course_id))
                .with("user", links::user(&member.user_id))
                .with("all", links::course_members(&member.course_id)),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoleModel {
    pub id: String,
    pub course: String,
    pub name: String,
    pub color: String,
    pub priority: i64,
    #[serde(rename = "_links")]
    pub links: Links,
}

impl From<&Role> for RoleModel {
    fn from(role: &Role) -> Self {
        Self {
            id: role.id.encode(),
            course: role.course_id.encode(),
            name: role.name.clone(),
            color: role.color.clone(),
            priority: role.priority,
            links: Links::new()
                .with("course", links::course(&role.course_id))
                .with("all", links::course_roles(&role.course_id)),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemModel {
    pub id: String,
    pub course: String,
    pub name: String,
    pub creation_date: String,
    pub creator: String,
    /// `Page` or `Assignment`.
    #[serde(rename = "type")]
    pub kind: String,
    pub visible_role: i64,
    pub parent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_problems: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_submissions: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sum_of_grades: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_grade: Option<f64>,
    #[serde(rename = "_links")]
    pub links: Links,
}

impl From<&CourseItem> for ItemModel {
    fn from(item: &CourseItem) -> Self {
        let mut hal = Links::new()
            .with("self", links::item(&item.id))
            .with("course", links::course(&item.course_id))
            .with("creator", links::user(&item.creator_id))
            .with("all", links::course_items(&item.course_id));
        if let Some(parent) = &item.parent_id {
            hal = hal.with("parent", links::item(parent));
        }

        let (text_path, number_of_problems, number_submissions, sum_of_grades) = match &item.content {
            ItemContent::Page { text_path } => (Some(text_path.clone()), None, None, None),
            ItemContent::Assignment {
                number_of_problems,
                number_submissions,
                sum_of_grades,
            } => (
                None,
                Some(*number_of_problems),
                Some(*number_submissions),
                Some(*sum_of_grades),
            ),
        };

        Self {
            id: item.id.encode(),
            course: item.course_id.encode(),
            name: item.name.clone(),
            creation_date: item.creation_date.clone(),
            creator: item.creator_id.encode(),
            kind: item.kind().as_str().to_string(),
            visible_role: item.visible_role,
            parent: item.parent_id.map(|parent| parent.encode()),
            children: None,
            text_path,
            number_of_problems,
            number_submissions,
            sum_of_grades,
            average_grade: item.average_grade(),
            links: hal,
        }
    }
}

macro_rules! hal_collection {
    ($collection:ident, $embedded:ident, $field:ident, $model:ty) => {
        #[derive(Debug, Serialize, ToSchema)]
        pub struct $embedded {
            pub $field: Vec<$model>,
        }

        #[derive(Debug, Serialize, ToSchema)]
        pub struct $collection {
            #[serde(rename = "_embedded")]
            pub embedded: $embedded,
            #[serde(rename = "_links")]
            pub links: Links,
        }

        impl $collection {
            pub fn new(items: Vec<$model>, links: Links) -> Self {
                Self {
                    embedded: $embedded { $field: items },
                    links,
                }
            }
        }
    };
}

hal_collection!(UserCollection, EmbeddedUsers, users, UserModel);
hal_collection!(CourseCollection, EmbeddedCourses, courses, CourseModel);
hal_collection!(MemberCollection, EmbeddedMembers, members, MemberModel);
hal_collection!(RoleCollection, EmbeddedRoles, roles, RoleModel);
hal_collection!(ItemCollection, EmbeddedItems, items, ItemModel);

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedResponse {
    /// Encoded identifier of the new entity.
    pub id: String,
    #[serde(rename = "_links")]
    pub links: Links,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserForm {
    pub name: String,
    pub password: String,
    pub email: String,
    /// `YYYY-MM-DD`.
    pub birthday: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserForm {
    pub id: String,
    pub display_name: String,
    pub username: String,
    pub password: String,
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteUserForm {
    pub id: String,
    pub password: String,
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCourseForm {
    /// The creating user; must be the caller.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct NicknameForm {
    #[serde(default)]
    pub nickname: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRoleForm {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    pub priority: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignRoleForm {
    /// Membership (course user) identifier.
    pub member: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateItemForm {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub visible_role: Option<i64>,
    /// Assignments only.
    #[serde(default)]
    pub number_of_problems: Option<i64>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct MoveItemForm {
    /// New parent; absent or blank moves the item to the top level.
    #[serde(default)]
    pub parent: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmissionForm {
    pub grade: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub users: i64,
    pub courses: i64,
    pub memberships: i64,
    pub items: i64,
}
