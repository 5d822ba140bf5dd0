//! Domain entities for the database layer

pub mod course;
pub mod item;
pub mod user;

pub use course::{Course, CourseUser, NewCourse, NewRole, Role, DEFAULT_ROLE_COLOR};
pub use item::{
    page_text_path, CourseItem, ItemContent, ItemKind, NewCourseItem, NewItemContent,
    DEFAULT_VISIBLE_ROLE,
};
pub use user::{default_authorities, NewUser, User, UserUpdate, AUTHORITY_ADMIN, AUTHORITY_USER};
