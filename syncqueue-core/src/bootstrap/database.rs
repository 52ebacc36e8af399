//! Postgres pool for the room store

use anyhow::{bail, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::{error, info};

use crate::Config;

/// Open the pool backing `PgRoomStore` and check it answers.
///
/// Only called when `database.url` is set; an empty URL means rooms live in
/// memory and there is nothing to connect to. Migrations are applied
/// separately via `repository::postgres::MIGRATOR`.
pub async fn init_database(config: &Config) -> Result<PgPool> {
    if !config.uses_database() {
        bail!("database.url is empty; the in-memory room store needs no pool");
    }

    let target = redact_url(config.database_url());
    info!(
        database = %target,
        max_connections = config.database.max_connections,
        "Connecting room store to Postgres"
    );

    let pool: PgPool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(config.database.connect_timeout_seconds))
        .idle_timeout(Duration::from_secs(config.database.idle_timeout_seconds))
        .connect(config.database_url())
        .await
        .map_err(|e| {
            error!(database = %target, "Failed to connect room store: {}", e);
            anyhow::anyhow!("Database connection failed: {e}")
        })?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Database did not answer liveness query: {e}"))?;

    info!(database = %target, "Room store connected");
    Ok(pool)
}

/// Drop the password from a connection URL so it can be logged
fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return "<unparsed>".to_string();
    };
    match rest.rsplit_once('@') {
        Some((userinfo, host)) => {
            let user = userinfo.split(':').next().unwrap_or_default();
            format!("{scheme}://{user}:***@{host}")
        }
        None => url.to_string(),
    }
}
