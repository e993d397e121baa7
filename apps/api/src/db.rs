use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates a PostgreSQL connection pool without connecting.
///
/// Connections are opened on first use, so an unreachable database surfaces as a
/// per-request store error instead of a failed startup. `sslmode` in the URL is
/// honoured; without it sqlx prefers TLS and falls back to plaintext.
pub fn create_pool(
    database_url: &str,
    max_connections: u32,
    acquire_timeout_secs: u64,
) -> Result<PgPool> {
    info!("Configuring PostgreSQL pool (max {max_connections} connections)...");

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(acquire_timeout_secs))
        .connect_lazy(database_url)
        .context("Database connection string is not a valid PostgreSQL URL")?;

    info!("PostgreSQL pool configured");
    Ok(pool)
}
