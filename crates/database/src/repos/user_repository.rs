//! User repository for database operations.

use chrono::Utc;
use euclid_identity::Identifier;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::entities::user::{join_authorities, parse_authorities};
use crate::entities::{NewUser, User, UserUpdate};
use crate::repos::item_repository::remove_item;
use crate::types::{DatabaseError, DatabaseResult};

const USER_COLUMNS: &str = "id, display_name, username, password_hash, email, birthday, locked, \
     credentials_expired, account_expired, enabled, authorities, created_at, updated_at";

/// Repository for user database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: &Identifier) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| map_user(&row)).transpose()
    }

    /// First user holding the given username.
    pub async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ? LIMIT 1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| map_user(&row)).transpose()
    }

    pub async fn exists_by_username(&self, username: &str) -> DatabaseResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    pub async fn exists_by_email(&self, email: &str) -> DatabaseResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// All users in registration order.
    pub async fn list(&self) -> DatabaseResult<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at, username"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_user).collect()
    }

    /// Insert a user under a freshly generated identifier.
    pub async fn create(&self, request: &NewUser) -> DatabaseResult<User> {
        let id = Identifier::generate()?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO users (id, display_name, username, password_hash, email, birthday, authorities, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(&request.display_name)
        .bind(&request.username)
        .bind(&request.password_hash)
        .bind(&request.email)
        .bind(request.birthday)
        .bind(join_authorities(&request.authorities))
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_unique(e, "user"))?;

        self.find_by_id(&id)
            .await?
            .ok_or(DatabaseError::NotFound("user"))
    }

    pub async fn update(&self, id: &Identifier, request: &UserUpdate) -> DatabaseResult<User> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "UPDATE users SET display_name = ?, username = ?, email = ?, password_hash = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&request.display_name)
        .bind(&request.username)
        .bind(&request.email)
        .bind(&request.password_hash)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_unique(e, "user"))?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("user"));
        }

        self.find_by_id(id)
            .await?
            .ok_or(DatabaseError::NotFound("user"))
    }

    /// Delete a user with their memberships and sessions. Items they authored are
    /// removed one by one so their children move up to the nearest surviving ancestor.
    pub async fn delete(&self, id: &Identifier) -> DatabaseResult<()> {
        let mut tx = self.pool.begin().await?;

        let authored: Vec<Identifier> =
            sqlx::query_scalar("SELECT id FROM course_items WHERE creator_id = ?")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;

        for item_id in &authored {
            let parent_id: Option<Identifier> =
                sqlx::query_scalar("SELECT parent_id FROM course_items WHERE id = ?")
                    .bind(item_id)
                    .fetch_one(&mut *tx)
                    .await?;
            remove_item(&mut tx, item_id, parent_id.as_ref()).await?;
        }

        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("user"));
        }

        tx.commit().await?;
        debug!(user = %id, items = authored.len(), "user deleted");
        Ok(())
    }

    pub async fn count(&self) -> DatabaseResult<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?)
    }
}

fn map_user(row: &SqliteRow) -> DatabaseResult<User> {
    let authorities: String = row.try_get("authorities")?;

    Ok(User {
        id: row.try_get("id")?,
        display_name: row.try_get("display_name")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        email: row.try_get("email")?,
        birthday: row.try_get("birthday")?,
        locked: row.try_get("locked")?,
        credentials_expired: row.try_get("credentials_expired")?,
        account_expired: row.try_get("account_expired")?,
        enabled: row.try_get("enabled")?,
        authorities: parse_authorities(&authorities),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
