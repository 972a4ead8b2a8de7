//! Application entry point and server initialization
//!
//! This module contains the main function that:
//! - Loads environment configuration
//! - Loads the catalog and the conversation log
//! - Starts the HTTP server with graceful shutdown support

use dotenvy::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use bookfinder::config::Config;
use bookfinder::route::create_app;
use bookfinder::service::{AppState, CatalogService};

/// Application entry point
///
/// 1. Loads environment variables from .env file
/// 2. Reads configuration (see [`Config::from_env`])
/// 3. Loads the catalog; a failure here stops the process before serving
/// 4. Creates the application state and router
/// 5. Starts the HTTP server with graceful shutdown handling
#[tokio::main]
async fn main() {
    // Load environment variables from .env file if it exists
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bookfinder=debug,tower_http=debug")),
        )
        .init();

    let config = Config::from_env();

    let service = match CatalogService::from_config(&config) {
        Ok(service) => service,
        Err(err) => {
            error!(error = %err, "failed to load data");
            std::process::exit(1);
        }
    };

    let app = create_app(AppState::new(service)).layer(TraceLayer::new_for_http());

    // Bind to all network interfaces on the specified port
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await.unwrap();

    info!(
        port = config.port,
        products = %config.products_path.display(),
        user_data = %config.user_data_path.display(),
        "server running at http://localhost:{}",
        config.port
    );

    // The server will continue running until it receives SIGTERM or SIGINT
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();
}

/// Returns when SIGINT (Ctrl+C) or, on Unix, SIGTERM is received
///
/// Open connections are allowed to complete before the process exits.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received, stopping server");
}
