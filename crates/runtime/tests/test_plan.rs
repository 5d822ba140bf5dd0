use std::path::Path;

use anyhow::{Context, Result};
use euclid_config::AppConfig;
use euclid_runtime::{demo, BackendServices};
use tempfile::TempDir;

fn sqlite_url(path: &Path) -> String {
    format!("sqlite://{}", path.to_string_lossy())
}

fn build_config(database_url: String, seed_demo_user: bool) -> AppConfig {
    let mut config = AppConfig::default();
    config.database.url = database_url;
    config.database.max_connections = 2;
    config.bootstrap.seed_demo_user = seed_demo_user;
    config
}

async fn initialise(config: &AppConfig) -> Result<BackendServices> {
    BackendServices::initialise(config)
        .await
        .context("failed to initialise backend services")
}

#[tokio::test(flavor = "multi_thread")]
async fn initialise_runs_migrations_and_seeds_demo_user() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("runtime/init.db");
    let config = build_config(sqlite_url(&db_path), true);

    let services = initialise(&config).await?;
    let table: String = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'course_items'",
    )
    .fetch_one(&services.db_pool)
    .await?;
    assert_eq!("course_items", table);

    let demo_user = services
        .repositories
        .users
        .find_by_username(demo::USERNAME)
        .await?
        .context("demo user should exist")?;
    assert_eq!(demo_user.email, demo::EMAIL);
    assert_eq!(demo_user.birthday.to_string(), "2000-01-01");

    services
        .authenticator
        .login_with_password(demo::USERNAME, demo::PASSWORD)
        .await?;

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn initialise_is_idempotent_across_restarts() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = build_config(sqlite_url(&temp_dir.path().join("restart.db")), true);

    let first = initialise(&config).await?;
    drop(first);

    let second = initialise(&config).await?;
    assert_eq!(second.repositories.users.count().await?, 1);
    assert!(second.seed_demo_user().await?.is_none());

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn initialise_skips_seeding_when_disabled() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = build_config(sqlite_url(&temp_dir.path().join("empty.db")), false);

    let services = initialise(&config).await?;
    assert_eq!(services.repositories.users.count().await?, 0);

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn initialise_fails_for_unusable_database_url() {
    let config = build_config("postgres://localhost/euclid".into(), false);

    let error = match initialise(&config).await {
        Ok(_) => panic!("non-sqlite url must be rejected"),
        Err(error) => error,
    };
    assert!(format!("{error:#}").contains("database"));
}
