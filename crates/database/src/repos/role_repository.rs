//! Course role repository.

use euclid_identity::Identifier;
use sqlx::SqlitePool;

use crate::entities::{NewRole, Role, DEFAULT_ROLE_COLOR};
use crate::types::{DatabaseError, DatabaseResult};

#[derive(Clone)]
pub struct RoleRepository {
    pool: SqlitePool,
}

impl RoleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: &NewRole) -> DatabaseResult<Role> {
        let role = Role {
            id: Identifier::generate()?,
            course_id: request.course_id,
            name: request.name.clone(),
            color: request
                .color
                .clone()
                .unwrap_or_else(|| DEFAULT_ROLE_COLOR.to_string()),
            priority: request.priority,
        };

        sqlx::query("INSERT INTO roles (id, course_id, name, color, priority) VALUES (?, ?, ?, ?, ?)")
            .bind(role.id)
            .bind(role.course_id)
            .bind(&role.name)
            .bind(&role.color)
            .bind(role.priority)
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_unique(e, "role"))?;

        Ok(role)
    }

    pub async fn find_by_id(&self, id: &Identifier) -> DatabaseResult<Option<Role>> {
        Ok(sqlx::query_as::<_, Role>(
            "SELECT id, course_id, name, color, priority FROM roles WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// Roles of a course, highest priority first.
    pub async fn list_by_course(&self, course_id: &Identifier) -> DatabaseResult<Vec<Role>> {
        Ok(sqlx::query_as::<_, Role>(
            "SELECT id, course_id, name, color, priority FROM roles
             WHERE course_id = ? ORDER BY priority DESC, name",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Roles held by one course member, highest priority first.
    pub async fn list_for_member(&self, member_id: &Identifier) -> DatabaseResult<Vec<Role>> {
        Ok(sqlx::query_as::<_, Role>(
            "SELECT r.id, r.course_id, r.name, r.color, r.priority FROM roles r
             INNER JOIN role_assignments ra ON ra.role_id = r.id
             WHERE ra.course_user_id = ? ORDER BY r.priority DESC, r.name",
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Grant a role to a member. Granting an already held role is a no-op.
    pub async fn assign(&self, role_id: &Identifier, member_id: &Identifier) -> DatabaseResult<()> {
        sqlx::query("INSERT OR IGNORE INTO role_assignments (role_id, course_user_id) VALUES (?, ?)")
            .bind(role_id)
            .bind(member_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_course, test_pool};

    fn role(course_id: Identifier, name: &str, priority: i64) -> NewRole {
        NewRole {
            course_id,
            name: name.to_string(),
            color: None,
            priority,
        }
    }

    #[tokio::test]
    async fn test_roles_are_ordered_by_priority() {
        let (pool, _temp_dir) = test_pool().await;
        let (course, _) = create_course(&pool, "bob").await;
        let repo = RoleRepository::new(pool);

        let student = repo.create(&role(course.id, "student", 1)).await.unwrap();
        let teacher = repo.create(&role(course.id, "lecturer", 100)).await.unwrap();
        assert_eq!(student.color, DEFAULT_ROLE_COLOR);

        let listed = repo.list_by_course(&course.id).await.unwrap();
        assert_eq!(listed, vec![teacher, student]);
    }

    #[tokio::test]
    async fn test_duplicate_role_name_in_course() {
        let (pool, _temp_dir) = test_pool().await;
        let (course, _) = create_course(&pool, "bob").await;
        let repo = RoleRepository::new(pool);

        repo.create(&role(course.id, "student", 1)).await.unwrap();
        assert!(matches!(
            repo.create(&role(course.id, "student", 2)).await,
            Err(DatabaseError::Duplicate("role"))
        ));
    }

    #[tokio::test]
    async fn test_assign_is_idempotent() {
        let (pool, _temp_dir) = test_pool().await;
        let (course, owner) = create_course(&pool, "bob").await;
        let repo = RoleRepository::new(pool);

        let tutor = repo.create(&role(course.id, "tutor", 10)).await.unwrap();
        repo.assign(&tutor.id, &owner.id).await.unwrap();
        repo.assign(&tutor.id, &owner.id).await.unwrap();

        assert_eq!(repo.list_for_member(&owner.id).await.unwrap(), vec![tutor]);
    }
}
