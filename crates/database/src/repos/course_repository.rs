//! Course repository for database operations.

use chrono::Utc;
use euclid_identity::Identifier;
use sqlx::SqlitePool;

use crate::entities::{Course, CourseUser, NewCourse};
use crate::types::DatabaseResult;

/// Repository for course database operations
#[derive(Clone)]
pub struct CourseRepository {
    pool: SqlitePool,
}

impl CourseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a course and enrol its creator in one transaction.
    ///
    /// Returns the course together with the creator's membership.
    pub async fn create(
        &self,
        request: &NewCourse,
        creator_nickname: &str,
    ) -> DatabaseResult<(Course, CourseUser)> {
        let course = Course {
            id: Identifier::generate()?,
            creator_id: request.creator_id,
            name: request.name.clone(),
            description: request.description.clone(),
            created_at: Utc::now().to_rfc3339(),
        };
        let member = CourseUser {
            id: Identifier::generate()?,
            course_id: course.id,
            user_id: request.creator_id,
            nickname: creator_nickname.to_string(),
            joined_at: course.created_at.clone(),
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO courses (id, creator_id, name, description, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(course.id)
        .bind(course.creator_id)
        .bind(&course.name)
        .bind(&course.description)
        .bind(&course.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO course_users (id, course_id, user_id, nickname, joined_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(member.id)
        .bind(member.course_id)
        .bind(member.user_id)
        .bind(&member.nickname)
        .bind(&member.joined_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((course, member))
    }

    pub async fn find_by_id(&self, id: &Identifier) -> DatabaseResult<Option<Course>> {
        Ok(sqlx::query_as::<_, Course>(
            "SELECT id, creator_id, name, description, created_at FROM courses WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    pub async fn list(&self) -> DatabaseResult<Vec<Course>> {
        Ok(sqlx::query_as::<_, Course>(
            "SELECT id, creator_id, name, description, created_at FROM courses ORDER BY created_at, name",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    /// Courses the user is a member of.
    pub async fn list_for_user(&self, user_id: &Identifier) -> DatabaseResult<Vec<Course>> {
        Ok(sqlx::query_as::<_, Course>(
            "SELECT c.id, c.creator_id, c.name, c.description, c.created_at
             FROM courses c
             INNER JOIN course_users cu ON cu.course_id = c.id
             WHERE cu.user_id = ?
             ORDER BY cu.joined_at, c.name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn count(&self) -> DatabaseResult<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM courses")
            .fetch_one(&self.pool)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_user, test_pool};
    use crate::MemberRepository;

    #[tokio::test]
    async fn test_create_course_enrols_creator() {
        let (pool, _temp_dir) = test_pool().await;
        let creator = create_user(&pool, "bob").await;
        let repo = CourseRepository::new(pool.clone());

        let (course, member) = repo
            .create(
                &NewCourse {
                    creator_id: creator.id,
                    name: "Algebra".into(),
                    description: "Groups and rings".into(),
                },
                "Bob",
            )
            .await
            .unwrap();

        assert_eq!(course.creator_id, creator.id);
        assert_eq!(member.course_id, course.id);
        assert_eq!(member.nickname, "Bob");

        let found = repo.find_by_id(&course.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Algebra");

        let members = MemberRepository::new(pool).list_by_course(&course.id).await.unwrap();
        assert_eq!(members, vec![member]);
    }

    #[tokio::test]
    async fn test_list_for_user_only_returns_joined_courses() {
        let (pool, _temp_dir) = test_pool().await;
        let bob = create_user(&pool, "bob").await;
        let alice = create_user(&pool, "alice").await;
        let repo = CourseRepository::new(pool);

        let new_course = |name: &str, creator_id| NewCourse {
            creator_id,
            name: name.to_string(),
            description: String::new(),
        };
        let (algebra, _) = repo.create(&new_course("Algebra", bob.id), "Bob").await.unwrap();
        repo.create(&new_course("Topology", alice.id), "Alice").await.unwrap();

        let bobs = repo.list_for_user(&bob.id).await.unwrap();
        assert_eq!(bobs, vec![algebra]);
        assert_eq!(repo.list().await.unwrap().len(), 2);
        assert_eq!(repo.count().await.unwrap(), 2);
    }
}
