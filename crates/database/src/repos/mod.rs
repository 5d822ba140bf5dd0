//! Database repository implementations

pub mod course_repository;
pub mod item_repository;
pub mod member_repository;
pub mod role_repository;
pub mod user_repository;

pub use course_repository::CourseRepository;
pub use item_repository::ItemRepository;
pub use member_repository::MemberRepository;
pub use role_repository::RoleRepository;
pub use user_repository::UserRepository;
