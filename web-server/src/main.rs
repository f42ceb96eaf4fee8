mod config;

use crate::config::{CONFIG_FILE, ServerConfig, load_config};
use axum::Router;
use axum::routing::get;
use tower_http::services::{ServeDir, ServeFile};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
/// Activates error tracing, reads the config and serves the wasm build of the car simulation.
/// Every unknown path gets the index page.
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=trace", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_target(true)
                .with_thread_ids(true)
                .with_thread_names(true),
        )
        .init();

    let config = match load_config(CONFIG_FILE).await {
        Ok(config) => config,
        Err(message) => {
            tracing::error!(message, "Initial load error.");
            panic!("Initial load error: {}", message);
        }
    };

    let listener = match tokio::net::TcpListener::bind(&config.bind_address).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%error, address = %config.bind_address, "Bind failed.");
            panic!("Can not bind to {}: {}", config.bind_address, error);
        }
    };
    tracing::info!(
        address = %config.bind_address,
        static_dir = %config.static_dir,
        "Serving the simulation."
    );

    if let Err(error) = axum::serve(listener, app(&config)).await {
        tracing::error!(%error, "Server stopped.");
    }
}

/// The routes: a health check, everything else comes from the static folder.
fn app(config: &ServerConfig) -> Router {
    Router::new().route("/health", get(health_handler)).fallback_service(
        ServeDir::new(&config.static_dir).not_found_service(ServeFile::new(config.index_path())),
    )
}

/// Answers as long as the server runs.
async fn health_handler() -> &'static str {
    "ok"
}
