//! Main entry point for the authentication service.
//!
//! This file initializes logging, connects to the datastore with bounded
//! retries, and serves the authentication routes until a shutdown signal
//! arrives.

use anyhow::Context;
use authgate::database::{ConnectionManager, SqliteConnector};
use authgate::{AppState, Config, auth_router};
use tracing::{debug, error, info};
use tracing_subscriber::fmt::init;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init();

    let config = Config::from_env()?;
    debug!(
        "Order broker configured at {} (queue {})",
        config.broker_uri, config.broker_queue
    );

    let manager = ConnectionManager::new(SqliteConnector::new(&config));
    let pool = match manager
        .connect_until(config.retry_policy(), shutdown_signal())
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            error!("Startup aborted: {}", e);
            return Err(e.into());
        }
    };

    let app = auth_router(AppState::new(&config, pool));

    let bind_address = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    info!("Starting auth server on port {}", config.server_port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    manager.disconnect().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
