use argon2::password_hash::{
    rand_core::OsRng as SaltRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use euclid_config::AuthConfig;
use euclid_database::{DatabaseError, NewUser, User, UserRepository};
use euclid_identity::{EntropySourceUnavailable, Identifier};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use thiserror::Error;
use tracing::{debug, info};

const SESSION_TOKEN_BYTES: usize = 32;
/// Longer configured lifetimes are capped to one hundred years.
const MAX_SESSION_TTL_SECONDS: i64 = 100 * 365 * 24 * 60 * 60;

#[derive(Clone)]
pub struct Authenticator {
    pool: SqlitePool,
    users: UserRepository,
    session_ttl: Duration,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("username already exists")]
    UsernameTaken,
    #[error("email already exists")]
    EmailTaken,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("account is inaccessible")]
    AccountInaccessible,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("repository error: {0}")]
    Repository(DatabaseError),
    #[error("password hashing failed: {0}")]
    PasswordHash(#[from] argon2::password_hash::Error),
    #[error(transparent)]
    Entropy(#[from] EntropySourceUnavailable),
    #[error("session not found")]
    SessionNotFound,
    #[error("session expired")]
    SessionExpired,
    #[error("invalid session token")]
    InvalidSession,
}

impl From<DatabaseError> for AuthError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::UsernameTaken => AuthError::UsernameTaken,
            DatabaseError::EmailTaken => AuthError::EmailTaken,
            DatabaseError::Entropy(inner) => AuthError::Entropy(inner),
            other => AuthError::Repository(other),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub token: String,
    #[serde(skip_serializing)]
    pub user_id: Identifier,
    pub expires_at: DateTime<Utc>,
}

/// Everything needed to open a password account.
#[derive(Debug, Clone)]
pub struct Registration {
    pub display_name: String,
    pub username: String,
    pub password: String,
    pub email: String,
    pub birthday: NaiveDate,
}

impl Authenticator {
    pub fn new(pool: SqlitePool, config: &AuthConfig) -> Self {
        let ttl_seconds = i64::try_from(config.session_ttl_seconds)
            .unwrap_or(i64::MAX)
            .min(MAX_SESSION_TTL_SECONDS);
        let session_ttl = Duration::seconds(ttl_seconds);

        Self {
            users: UserRepository::new(pool.clone()),
            pool,
            session_ttl,
        }
    }

    pub fn pool(&self) -> SqlitePool {
        self.pool.clone()
    }

    /// Create an account holding the `USER` authority.
    pub async fn register_with_password(&self, registration: &Registration) -> Result<User, AuthError> {
        if self.users.exists_by_username(&registration.username).await? {
            return Err(AuthError::UsernameTaken);
        }
        if self.users.exists_by_email(&registration.email).await? {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = hash_password(&registration.password)?;
        let user = self
            .users
            .create(&NewUser::with_default_authorities(
                registration.display_name.clone(),
                registration.username.clone(),
                password_hash,
                registration.email.clone(),
                registration.birthday,
            ))
            .await?;

        info!(user = %user.id, username = %user.username, "registered user");
        Ok(user)
    }

    /// Form login. Inaccessible accounts are refused even with correct credentials.
    pub async fn login_with_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(User, AuthSession), AuthError> {
        let Some(user) = self.users.find_by_username(username).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }
        if !user.is_accessible() {
            return Err(AuthError::AccountInaccessible);
        }

        let session = self.issue_session(&user.id).await?;
        debug!(user = %user.id, "issued session");
        Ok((user, session))
    }

    pub async fn authenticate_token(&self, token: &str) -> Result<(User, AuthSession), AuthError> {
        let (user, session) = self.resolve_session(token).await?;

        if !user.is_accessible() {
            return Err(AuthError::AccountInaccessible);
        }

        Ok((user, session))
    }

    /// Resolve a live session to its owner without checking the account status flags.
    pub async fn resolve_session(&self, token: &str) -> Result<(User, AuthSession), AuthError> {
        let row = sqlx::query("SELECT user_id, expires_at FROM sessions WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Err(AuthError::SessionNotFound);
        };

        let user_id: Identifier = row.try_get("user_id")?;
        let expires_at: String = row.try_get("expires_at")?;

        let expires_at = DateTime::parse_from_rfc3339(&expires_at)
            .map_err(|_| AuthError::InvalidSession)?
            .with_timezone(&Utc);

        if expires_at <= Utc::now() {
            self.revoke_session(token).await?;
            return Err(AuthError::SessionExpired);
        }

        let user = self
            .users
            .find_by_id(&user_id)
            .await?
            .ok_or(AuthError::SessionNotFound)?;

        let session = AuthSession {
            token: token.to_owned(),
            user_id,
            expires_at,
        };

        Ok((user, session))
    }

    pub async fn revoke_session(&self, token: &str) -> Result<(), AuthError> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Drop every expired session. Returns how many were removed.
    pub async fn purge_expired_sessions(&self) -> Result<u64, AuthError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn issue_session(&self, user_id: &Identifier) -> Result<AuthSession, AuthError> {
        let token = generate_session_token()?;
        let now = Utc::now();
        let expires_at = now + self.session_ttl;

        sqlx::query(
            "INSERT INTO sessions (user_id, token, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(&token)
        .bind(now.to_rfc3339())
        .bind(expires_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(AuthSession {
            token,
            user_id: *user_id,
            expires_at,
        })
    }
}

/// Hash a password into a PHC string with a fresh salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut SaltRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Check a password against a stored PHC hash.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(stored_hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

fn generate_session_token() -> Result<String, AuthError> {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(EntropySourceUnavailable::from)?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_passwords_verify_and_are_salted() {
        let first = hash_password("password").unwrap();
        let second = hash_password("password").unwrap();

        assert_ne!(first, second);
        assert!(first.starts_with("$argon2"));
        assert!(verify_password("password", &first).unwrap());
        assert!(!verify_password("Password", &first).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(matches!(
            verify_password("password", "not-a-phc-string"),
            Err(AuthError::PasswordHash(_))
        ));
    }

    #[test]
    fn session_tokens_are_url_safe() {
        let token = generate_session_token().unwrap();
        assert_eq!(token.len(), 43);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
