use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use neuromate_api::auth::JwtIdentity;
use neuromate_api::config::AppConfig;
use neuromate_api::database::postgres::PgStore;
use neuromate_api::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, AUTH_JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("neuromate_api=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!("Starting NeuroMate API in {:?} mode", config.environment);

    let store = PgStore::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    if config.database.run_migrations {
        store.migrate().await.context("failed to run migrations")?;
    }

    let identity = JwtIdentity::from_config(&config.auth).context("invalid auth configuration")?;

    let bind_addr = config.bind_address();
    let state = AppState {
        store: Arc::new(store),
        identity: Arc::new(identity),
        config: Arc::new(config),
    };

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("NeuroMate API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
