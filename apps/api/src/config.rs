use std::str::FromStr;

use anyhow::{bail, Context, Result};

/// Environment variables checked for the database connection string, in order.
/// The first one holding a non-empty value wins.
pub const CONNECTION_STRING_SOURCES: &[&str] = &["NETLIFY_DATABASE_URL", "DATABASE_URL"];

/// Which store adapter serves queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Long-lived sqlx connection pool.
    Pool,
    /// Serverless SQL-over-HTTP endpoint.
    Http,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Pool => "pool",
            StoreBackend::Http => "http",
        }
    }
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pool" | "pg" | "postgres" => Ok(StoreBackend::Pool),
            "http" | "neon" | "serverless" => Ok(StoreBackend::Http),
            other => bail!("Unknown store backend '{other}' (expected 'pool' or 'http')"),
        }
    }
}

/// Application configuration loaded from environment variables.
///
/// A missing connection string is not a startup failure: `database_url` stays
/// `None` and every store-backed request answers with a configuration error.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub store_backend: StoreBackend,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Config {
            database_url: resolve_connection_string(&lookup),
            store_backend: lookup("TESTIMONIALS_STORE")
                .map(|v| v.parse::<StoreBackend>())
                .transpose()?
                .unwrap_or(StoreBackend::Pool),
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?,
            db_acquire_timeout_secs: parse_or(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", 10)?,
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

/// Walks `CONNECTION_STRING_SOURCES` and returns the first non-empty value.
pub fn resolve_connection_string<F>(lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    CONNECTION_STRING_SOURCES
        .iter()
        .filter_map(|key| lookup(key))
        .find(|value| !value.trim().is_empty())
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
