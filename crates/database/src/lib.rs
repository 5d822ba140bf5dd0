//! Euclid Database Crate
//!
//! Connection management, migrations and repositories for users, courses,
//! course membership, roles and course items. All rows are keyed by
//! [`euclid_identity::Identifier`] stored as an 18-byte BLOB.

use euclid_config::DatabaseConfig;
use sqlx::SqlitePool;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

pub use connection::prepare_database;
pub use migrations::{run_migrations, MIGRATOR};

pub use repos::{CourseRepository, ItemRepository, MemberRepository, RoleRepository, UserRepository};

pub use entities::{
    default_authorities, page_text_path, Course, CourseItem, CourseUser, ItemContent, ItemKind,
    NewCourse, NewCourseItem, NewItemContent, NewRole, NewUser, Role, User, UserUpdate,
    AUTHORITY_ADMIN, AUTHORITY_USER, DEFAULT_ROLE_COLOR, DEFAULT_VISIBLE_ROLE,
};

pub use types::{DatabaseError, DatabaseResult};

/// Every repository over one shared pool.
#[derive(Clone)]
pub struct Repositories {
    pub users: UserRepository,
    pub courses: CourseRepository,
    pub members: MemberRepository,
    pub roles: RoleRepository,
    pub items: ItemRepository,
}

impl Repositories {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            courses: CourseRepository::new(pool.clone()),
            members: MemberRepository::new(pool.clone()),
            roles: RoleRepository::new(pool.clone()),
            items: ItemRepository::new(pool),
        }
    }
}

/// Initialize the database with migrations
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(format!("{e:#}")))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(format!("{e:#}")))?;

    Ok(pool)
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;
    use sqlx::SqlitePool;
    use tempfile::TempDir;

    use super::*;

    pub async fn test_pool() -> (SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let config = DatabaseConfig {
            url: format!("sqlite:{}", db_path.display()),
            max_connections: 1,
        };

        let pool = initialize_database(&config).await.unwrap();
        (pool, temp_dir)
    }

    pub async fn create_user(pool: &SqlitePool, username: &str) -> User {
        UserRepository::new(pool.clone())
            .create(&NewUser::with_default_authorities(
                username,
                username,
                "hash",
                format!("{username}@email.com"),
                NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            ))
            .await
            .unwrap()
    }

    /// A course created by a fresh user, with the creator's membership.
    pub async fn create_course(pool: &SqlitePool, creator: &str) -> (Course, CourseUser) {
        let user = create_user(pool, creator).await;
        CourseRepository::new(pool.clone())
            .create(
                &NewCourse {
                    creator_id: user.id,
                    name: format!("{creator}'s course"),
                    description: String::new(),
                },
                &user.display_name,
            )
            .await
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::test_pool;

    #[tokio::test]
    async fn test_database_initialization_creates_schema() {
        let (pool, _temp_dir) = test_pool().await;

        let tables: Vec<String> =
            sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
                .fetch_all(&pool)
                .await
                .unwrap();

        for table in ["course_items", "course_users", "courses", "roles", "sessions", "users"] {
            assert!(tables.iter().any(|t| t == table), "missing table {table}");
        }
    }

    #[tokio::test]
    async fn test_identifier_length_is_enforced() {
        let (pool, _temp_dir) = test_pool().await;

        let result = sqlx::query(
            "INSERT INTO courses (id, creator_id, name, description, created_at) VALUES (?, ?, 'x', '', '')",
        )
        .bind(vec![0u8; 4])
        .bind(vec![0u8; 18])
        .execute(&pool)
        .await;

        assert!(result.is_err());
    }
}
