// src/db.rs

use std::{str::FromStr, time::Duration};

use sqlx::{
    SqlitePool,
    migrate::Migrator,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use crate::{config::Config, error::AppError, models::user::Role, services, utils::hash::hash_password};

/// Schema migrations, embedded at compile time.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Opens the pool, creating the database file if needed.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect_with(options)
        .await
}

/// Connects with retry, for databases that come up after the service.
pub async fn connect_with_retry(database_url: &str, attempts: u32) -> Result<SqlitePool, sqlx::Error> {
    let mut retry_count = 0;
    loop {
        match connect(database_url).await {
            Ok(pool) => return Ok(pool),
            Err(e) if retry_count < attempts => {
                retry_count += 1;
                tracing::warn!(
                    "Database not ready ({}), retrying in 2s... (Attempt {})",
                    e,
                    retry_count
                );
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Creates the configured admin account if it does not exist yet.
pub async fn seed_admin_user(pool: &SqlitePool, config: &Config) -> Result<(), AppError> {
    let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) else {
        return Ok(());
    };

    if services::user::get_by_username(pool, username).await?.is_none() {
        tracing::info!("Seeding admin user: {}", username);
        let hashed_password = hash_password(password)?;
        services::user::create(pool, username, &hashed_password, Role::Admin).await?;
        tracing::info!("Admin user created successfully.");
    }

    Ok(())
}

/// Fresh migrated in-memory database for unit tests.
#[cfg(test)]
pub async fn memory_pool() -> SqlitePool {
    // One connection that never recycles, so the database outlives each query.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite");
    MIGRATOR.run(&pool).await.expect("Failed to migrate database");
    pool
}
