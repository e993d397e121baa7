mod config;
mod db;
mod errors;
mod models;
mod routes;
mod state;
mod store;
mod testimonials;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, CONNECTION_STRING_SOURCES};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{build_executor, StoreUnavailable};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; a missing connection string is tolerated here
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Testimonials API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the store adapter (pooled driver or HTTP client); failures are
    // reported per request rather than stopping the process
    let store = build_executor(&config);
    if let Err(StoreUnavailable::Missing) = &store {
        warn!(
            "No connection string found in {}; store-backed requests will fail",
            CONNECTION_STRING_SOURCES.join(" / ")
        );
    }

    let state = AppState {
        store,
        config: config.clone(),
    };

    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
