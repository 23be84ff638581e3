//! Consent Tracker - Binary Entry Point
//!
//! This is the main entry point for the consent-server binary.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use consent_tracker::api::{create_router, AppState};
use consent_tracker::types::ServerResult;
use consent_tracker::ServerConfig;

#[tokio::main]
async fn main() -> ServerResult<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "consent_tracker=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    info!(
        consent_capacity = config.catalog.consent_capacity,
        analytics_capacity = config.catalog.analytics_capacity,
        marketing_capacity = config.catalog.marketing_capacity,
        rate_limit = config.rate_limit.enabled,
        "Initializing event stores"
    );

    let address = config.bind_address();
    let state = Arc::new(AppState::from_config(config));
    let app = create_router(state);

    let listener = TcpListener::bind(&address).await?;
    let port = listener.local_addr()?.port();
    info!("Consent API server running on {address}");
    info!("Health check: http://localhost:{port}/health");
    info!("Dashboard stats: http://localhost:{port}/api/stats");
    info!("Consent endpoint: http://localhost:{port}/api/consent");
    info!("Analytics endpoint: http://localhost:{port}/api/analytics");
    info!("Marketing endpoint: http://localhost:{port}/api/marketing");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
