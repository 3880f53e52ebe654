// ABOUTME: API server startup for `okrdesk serve`
// ABOUTME: Opens the database, bootstraps the administrator, and serves the router

use std::net::SocketAddr;

use chrono::Duration;
use okrdesk_api::{create_router, DbState};
use okrdesk_config::Config;
use okrdesk_security::{ensure_admin, BootstrapOutcome};
use okrdesk_storage::connect;
use tracing::info;

pub async fn run_server(config: Config) -> anyhow::Result<()> {
    info!("Opening database at {}", config.database_path.display());
    let pool = connect(&config.database_path).await?;

    let state = DbState::new(pool, Duration::hours(config.session_ttl_hours));

    let admin = ensure_admin(&state.user_storage, &config.admin).await?;
    if matches!(admin, BootstrapOutcome::Created(_)) {
        info!("Sign in as {} to manage users", admin.user().email);
    }

    let purged = state.session_storage.purge_expired().await?;
    if purged > 0 {
        info!("Removed {} expired sessions", purged);
    }

    let app = create_router(state, &config.cors_origin);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Could not listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
