//! Serve command - Starts the HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{Cache, Database, InfraHealth, LocalFileStorage, SecretCipher};
use crate::jobs::{connect_job_pool, PostgresEmailQueue};
use crate::services::{ServiceDeps, Services};

/// Execute the serve command
pub async fn execute(args: ServeArgs, config: Config) -> AppResult<()> {
    tracing::info!("Starting server...");

    let db = Database::connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;
    tracing::info!("Database connected");

    let cache = Cache::connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Redis connection failed: {}", e)))?;
    tracing::info!("Redis cache connected");

    let job_pool = connect_job_pool(&config.database_url).await?;

    let deps = ServiceDeps {
        tokens: Arc::new(cache.clone()),
        emails: Arc::new(PostgresEmailQueue::new(job_pool)),
        files: Arc::new(LocalFileStorage::new(config.upload_dir.clone())),
        cipher: SecretCipher::new(config.encryption_key()),
    };
    let services = Services::from_connection(db.get_connection(), deps, config.clone());

    let app_state = AppState::new(
        Arc::new(services),
        Arc::new(cache.clone()),
        Arc::new(InfraHealth::new(db, cache)),
        config,
    );

    let app = create_router(app_state);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    // Peer address feeds the activity log when no proxy header is present
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
