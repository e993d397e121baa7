use std::sync::Arc;

use crate::config::Config;
use crate::errors::AppError;
use crate::store::{QueryExecutor, StoreUnavailable};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Built once at startup; the error side records why no store is available.
    pub store: Result<Arc<dyn QueryExecutor>, StoreUnavailable>,
    pub config: Config,
}

impl AppState {
    /// The configured store adapter, or a configuration error for this request.
    pub fn store(&self) -> Result<&dyn QueryExecutor, AppError> {
        match &self.store {
            Ok(executor) => Ok(executor.as_ref()),
            Err(StoreUnavailable::Missing) => Err(AppError::Configuration),
            Err(StoreUnavailable::Invalid(details)) => {
                Err(AppError::InvalidConfiguration(details.clone()))
            }
        }
    }
}
