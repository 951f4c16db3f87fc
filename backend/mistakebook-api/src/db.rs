use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;

use crate::config::Config;

/// Open the connection pool and apply the embedded migrations.
pub async fn init_pool(config: &Config) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database_url)
        .with_context(|| format!("Invalid database URL: {}", config.database_url))?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let options = if config.is_in_memory() {
        options
    } else {
        options.journal_mode(SqliteJournalMode::Wal)
    };

    let mut pool_options =
        SqlitePoolOptions::new().max_connections(config.database_max_connections);

    if config.is_in_memory() {
        // Each connection to an in-memory database sees its own empty database,
        // so the pool must hold exactly one connection for the process lifetime.
        pool_options = pool_options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    let pool = pool_options
        .connect_with(options)
        .await
        .context("Failed to connect to SQLite")?;

    tracing::info!("Applying database migrations");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to apply database migrations")?;

    Ok(pool)
}
