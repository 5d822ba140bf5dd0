//! Course, membership and role entities

use euclid_identity::Identifier;
use serde::Serialize;
use sqlx::FromRow;

pub const DEFAULT_ROLE_COLOR: &str = "#ffffff";

macro_rules! identity_eq {
    ($ty:ty) => {
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                self.id == other.id
            }
        }

        impl Eq for $ty {}

        impl ::std::hash::Hash for $ty {
            fn hash<H: ::std::hash::Hasher>(&self, state: &mut H) {
                ::std::hash::Hash::hash(&self.id, state);
            }
        }
    };
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Course {
    pub id: Identifier,
    pub creator_id: Identifier,
    pub name: String,
    pub description: String,
    pub created_at: String,
}

identity_eq!(Course);

#[derive(Debug, Clone)]
pub struct NewCourse {
    pub creator_id: Identifier,
    pub name: String,
    pub description: String,
}

/// A user's membership in a course.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CourseUser {
    pub id: Identifier,
    pub course_id: Identifier,
    pub user_id: Identifier,
    pub nickname: String,
    pub joined_at: String,
}

identity_eq!(CourseUser);

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Role {
    pub id: Identifier,
    pub course_id: Identifier,
    pub name: String,
    pub color: String,
    pub priority: i64,
}

identity_eq!(Role);

#[derive(Debug, Clone)]
pub struct NewRole {
    pub course_id: Identifier,
    pub name: String,
    pub color: Option<String>,
    pub priority: i64,
}

pub(crate) use identity_eq;
