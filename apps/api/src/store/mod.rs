//! Store access: the single collaborator behind every testimonial query.
//!
//! Handlers only ever see `Arc<dyn QueryExecutor>`. Which realization sits
//! behind it (pooled Postgres driver or the serverless HTTP endpoint) is decided
//! once at startup by `build_executor`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{error, info};

use crate::config::{Config, StoreBackend};

pub mod http;
#[cfg(test)]
pub mod memory;
pub mod pooled;

/// A result row keyed by column name. Both adapters produce this shape.
pub type Row = Map<String, Value>;

/// Positional parameter bound to `$1`, `$2`, ...
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    NullableText(Option<String>),
    Int(i32),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("query endpoint returned status {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("could not decode row: {0}")]
    Decode(String),
}

/// Executes one parameterized statement and returns every row it produced.
///
/// Connection lifecycle is the implementor's business; callers never acquire or
/// release anything themselves.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn query(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<Row>, StoreError>;

    /// Short backend label for logs and `/health`.
    fn backend(&self) -> &'static str;
}

/// Why no executor is available. Held in `AppState` so every store-backed request
/// reports it instead of the process refusing to start.
#[derive(Debug, Clone, Error)]
pub enum StoreUnavailable {
    #[error("no connection string configured")]
    Missing,

    #[error("{0}")]
    Invalid(String),
}

/// Builds the configured executor once at startup.
pub fn build_executor(config: &Config) -> Result<Arc<dyn QueryExecutor>, StoreUnavailable> {
    let Some(url) = config.database_url.as_deref() else {
        return Err(StoreUnavailable::Missing);
    };

    let executor: anyhow::Result<Arc<dyn QueryExecutor>> = match config.store_backend {
        StoreBackend::Pool => crate::db::create_pool(
            url,
            config.db_max_connections,
            config.db_acquire_timeout_secs,
        )
        .map(|pool| Arc::new(pooled::PooledExecutor::new(pool)) as Arc<dyn QueryExecutor>),
        StoreBackend::Http => http::HttpExecutor::from_connection_string(url)
            .map(|client| Arc::new(client) as Arc<dyn QueryExecutor>),
    };

    match executor {
        Ok(executor) => {
            info!("Store adapter ready (backend: {})", executor.backend());
            Ok(executor)
        }
        Err(e) => {
            error!("Store adapter could not be built: {e:#}");
            Err(StoreUnavailable::Invalid(format!("{e:#}")))
        }
    }
}

/// Renders a timestamp the way every adapter exposes it in a `Row`.
pub(crate) fn timestamp_value(ts: DateTime<Utc>) -> Value {
    Value::String(ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}
