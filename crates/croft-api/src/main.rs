//! # croft-api — Binary Entry Point
//!
//! Starts the Axum HTTP server. Configuration comes from flags with
//! environment fallbacks; the optional database and seed file are
//! applied before the listener opens.

use std::path::PathBuf;

use clap::Parser;
use croft_api::state::{AppConfig, AppState};

/// Croft multi-tenant API server.
#[derive(Parser, Debug)]
#[command(name = "croft-api", version, about)]
struct Cli {
    /// Port to bind the HTTP server to.
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,

    /// Token validity window in seconds.
    #[arg(long, env = "TOKEN_TTL_SECS", default_value_t = 86_400)]
    token_ttl_secs: i64,

    /// Path to a JSON seed file provisioning tenants and users at
    /// startup.
    #[arg(long, env = "CROFT_SEED")]
    seed: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Initialize database pool (optional — absent means in-memory only).
    let db_pool = croft_api::db::init_pool().await.map_err(|e| {
        tracing::error!("database initialization failed: {e}");
        e
    })?;

    let config = AppConfig {
        port: cli.port,
        token_ttl_secs: cli.token_ttl_secs,
    };
    let state = AppState::with_config(config, db_pool);

    // Hydrate in-memory stores from the database (if connected).
    state.hydrate_from_db().await.map_err(|e| {
        tracing::error!("database hydration failed: {e}");
        e
    })?;

    // Apply the seed file (if configured).
    if let Some(seed) = &cli.seed {
        croft_api::bootstrap::bootstrap(&state, seed).await.map_err(|e| {
            tracing::error!("seed bootstrap failed: {e}");
            e
        })?;
    }

    if state.directory.is_empty() {
        tracing::warn!(
            "no tenants registered — every request will fail tenant resolution \
             until a seed file or database provides tenants"
        );
    }

    let app = croft_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], cli.port));
    tracing::info!("Croft API listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
