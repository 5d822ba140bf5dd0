//! Course membership repository.

use chrono::Utc;
use euclid_identity::Identifier;
use sqlx::SqlitePool;

use crate::entities::CourseUser;
use crate::types::{DatabaseError, DatabaseResult};

/// Repository for course membership (`course_users`) rows
#[derive(Clone)]
pub struct MemberRepository {
    pool: SqlitePool,
}

impl MemberRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Enrol a user in a course. Fails with `Duplicate` if already a member.
    pub async fn add(
        &self,
        course_id: &Identifier,
        user_id: &Identifier,
        nickname: &str,
    ) -> DatabaseResult<CourseUser> {
        let member = CourseUser {
            id: Identifier::generate()?,
            course_id: *course_id,
            user_id: *user_id,
            nickname: nickname.to_string(),
            joined_at: Utc::now().to_rfc3339(),
        };

        sqlx::query(
            "INSERT INTO course_users (id, course_id, user_id, nickname, joined_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(member.id)
        .bind(member.course_id)
        .bind(member.user_id)
        .bind(&member.nickname)
        .bind(&member.joined_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_unique(e, "membership"))?;

        Ok(member)
    }

    pub async fn find_by_id(&self, id: &Identifier) -> DatabaseResult<Option<CourseUser>> {
        Ok(sqlx::query_as::<_, CourseUser>(
            "SELECT id, course_id, user_id, nickname, joined_at FROM course_users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// Membership of `user_id` in `course_id`, if any.
    pub async fn find(
        &self,
        course_id: &Identifier,
        user_id: &Identifier,
    ) -> DatabaseResult<Option<CourseUser>> {
        Ok(sqlx::query_as::<_, CourseUser>(
            "SELECT id, course_id, user_id, nickname, joined_at FROM course_users
             WHERE course_id = ? AND user_id = ?",
        )
        .bind(course_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    pub async fn list_by_course(&self, course_id: &Identifier) -> DatabaseResult<Vec<CourseUser>> {
        Ok(sqlx::query_as::<_, CourseUser>(
            "SELECT id, course_id, user_id, nickname, joined_at FROM course_users
             WHERE course_id = ? ORDER BY joined_at, nickname",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn update_nickname(&self, id: &Identifier, nickname: &str) -> DatabaseResult<CourseUser> {
        let result = sqlx::query("UPDATE course_users SET nickname = ? WHERE id = ?")
            .bind(nickname)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("membership"));
        }

        self.find_by_id(id)
            .await?
            .ok_or(DatabaseError::NotFound("membership"))
    }

    /// Remove a membership; its role assignments cascade.
    pub async fn remove(&self, id: &Identifier) -> DatabaseResult<()> {
        let result = sqlx::query("DELETE FROM course_users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("membership"));
        }
        Ok(())
    }

    /// Highest priority among the member's roles, or 0 without roles.
    pub async fn effective_priority(&self, member_id: &Identifier) -> DatabaseResult<i64> {
        let priority: Option<i64> = sqlx::query_scalar(
            "SELECT MAX(r.priority) FROM roles r
             INNER JOIN role_assignments ra ON ra.role_id = r.id
             WHERE ra.course_user_id = ?",
        )
        .bind(member_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(priority.unwrap_or(0))
    }

    pub async fn count(&self) -> DatabaseResult<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM course_users")
            .fetch_one(&self.pool)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::NewRole;
    use crate::test_support::{create_course, create_user, test_pool};
    use crate::RoleRepository;

    #[tokio::test]
    async fn test_join_twice_is_duplicate() {
        let (pool, _temp_dir) = test_pool().await;
        let (course, _) = create_course(&pool, "bob").await;
        let alice = create_user(&pool, "alice").await;
        let repo = MemberRepository::new(pool);

        let member = repo.add(&course.id, &alice.id, "Al").await.unwrap();
        assert_eq!(repo.find(&course.id, &alice.id).await.unwrap(), Some(member));
        assert!(matches!(
            repo.add(&course.id, &alice.id, "Al").await,
            Err(DatabaseError::Duplicate("membership"))
        ));
    }

    #[tokio::test]
    async fn test_nickname_update_and_removal() {
        let (pool, _temp_dir) = test_pool().await;
        let (course, _) = create_course(&pool, "bob").await;
        let alice = create_user(&pool, "alice").await;
        let repo = MemberRepository::new(pool);

        let member = repo.add(&course.id, &alice.id, "Al").await.unwrap();
        let renamed = repo.update_nickname(&member.id, "Ally").await.unwrap();
        assert_eq!(renamed.nickname, "Ally");

        repo.remove(&member.id).await.unwrap();
        assert!(repo.find(&course.id, &alice.id).await.unwrap().is_none());
        assert_eq!(repo.list_by_course(&course.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_effective_priority_is_max_of_roles() {
        let (pool, _temp_dir) = test_pool().await;
        let (course, owner) = create_course(&pool, "bob").await;
        let members = MemberRepository::new(pool.clone());
        let roles = RoleRepository::new(pool);

        assert_eq!(members.effective_priority(&owner.id).await.unwrap(), 0);

        for (name, priority) in [("student", 5), ("tutor", 20)] {
            let role = roles
                .create(&NewRole {
                    course_id: course.id,
                    name: name.to_string(),
                    color: None,
                    priority,
                })
                .await
                .unwrap();
            roles.assign(&role.id, &owner.id).await.unwrap();
        }

        assert_eq!(members.effective_priority(&owner.id).await.unwrap(), 20);
    }
}
