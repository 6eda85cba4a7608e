//! Database adapters: connection pool bootstrap and schema setup.

use std::time::Duration;

use anyhow::Context;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::instrument;

use crate::config::PostgresConfig;

/// Idempotent DDL for the inventory tables.
pub const SCHEMA: &str = include_str!("../migrations/0001_inventory.sql");

/// Open a connection pool using the configured limits.
#[instrument(skip(config), fields(max_connections = config.max_connections))]
pub async fn connect(config: &PostgresConfig) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(&config.url)
        .await
        .context("unable to create connection pool")?;

    if config.apply_schema {
        apply_schema(&pool).await?;
    }

    Ok(pool)
}

/// Create the inventory tables and seed the status lookup if missing.
pub async fn apply_schema(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .await
        .context("failed to apply inventory schema")?;
    tracing::info!("inventory schema applied");
    Ok(())
}
