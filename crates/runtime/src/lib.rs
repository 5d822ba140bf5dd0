use anyhow::{Context, Result};
use chrono::NaiveDate;
use euclid_auth::{AuthError, Authenticator, Registration};
use euclid_config::AppConfig;
use euclid_database::{initialize_database, Repositories, User};
use sqlx::SqlitePool;
use tracing::{info, warn};

pub mod telemetry {
    use anyhow::Result;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

        let subscriber = SubscriberBuilder::default()
            .with_env_filter(env_filter)
            .with_target(true)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

/// Account created on first start so a fresh install can be logged into.
pub mod demo {
    pub const DISPLAY_NAME: &str = "Bob";
    pub const USERNAME: &str = "Bob";
    pub const PASSWORD: &str = "password";
    pub const EMAIL: &str = "bob@email.com";
}

#[derive(Clone)]
pub struct BackendServices {
    pub db_pool: SqlitePool,
    pub authenticator: Authenticator,
    pub repositories: Repositories,
}

impl BackendServices {
    /// Verify the entropy source, open and migrate the database, then apply bootstrap settings.
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        euclid_identity::ensure_entropy_source()
            .context("cannot generate identifiers without an entropy source")?;

        let db_pool = initialize_database(&config.database)
            .await
            .context("failed to initialise database")?;

        let authenticator = Authenticator::new(db_pool.clone(), &config.auth);
        let repositories = Repositories::new(db_pool.clone());

        let purged = authenticator
            .purge_expired_sessions()
            .await
            .context("failed to purge expired sessions")?;
        if purged > 0 {
            info!(purged, "removed expired sessions");
        }

        let services = Self {
            db_pool,
            authenticator,
            repositories,
        };

        if config.bootstrap.seed_demo_user {
            services.seed_demo_user().await?;
        }

        Ok(services)
    }

    /// Register the demo account unless its username or email is taken.
    ///
    /// Returns the new user, or `None` when it already existed.
    pub async fn seed_demo_user(&self) -> Result<Option<User>> {
        let birthday = NaiveDate::from_ymd_opt(2000, 1, 1).context("invalid demo birthday")?;
        let registration = Registration {
            display_name: demo::DISPLAY_NAME.to_string(),
            username: demo::USERNAME.to_string(),
            password: demo::PASSWORD.to_string(),
            email: demo::EMAIL.to_string(),
            birthday,
        };

        match self.authenticator.register_with_password(&registration).await {
            Ok(user) => {
                info!(user = %user.id, username = %user.username, "seeded demo user");
                Ok(Some(user))
            }
            Err(AuthError::UsernameTaken | AuthError::EmailTaken) => {
                info!(username = demo::USERNAME, "demo user already present");
                Ok(None)
            }
            Err(error) => {
                warn!(%error, "failed to seed demo user");
                Err(error).context("failed to seed demo user")
            }
        }
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
