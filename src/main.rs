use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use place_rs::config::PlaceConfig;
use place_rs::error::ServerError;
use place_rs::{api, AppState};

#[tokio::main]
async fn main() {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("place_rs={},tower_http=info", config.server.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run(config).await {
        tracing::error!("Server stopped: {}", e);
        std::process::exit(1);
    }
}

/// Config path from the first argument or `PLACE_CONFIG`, defaults otherwise
fn load_config() -> Result<PlaceConfig, ServerError> {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("PLACE_CONFIG").ok())
        .map(PathBuf::from);

    match path {
        Some(path) => Ok(PlaceConfig::load_file(path)?),
        None => Ok(PlaceConfig::default()),
    }
}

async fn run(config: PlaceConfig) -> Result<(), ServerError> {
    let state = AppState::from_config(&config)?;

    // Touch the canvas so lazy initialization happens before the first request
    if let Err(e) = state.coordinator.canvas(state.now_ms()).await {
        tracing::warn!("Canvas not ready at startup: {}", e);
    }

    let size = state.coordinator.canvas_size();
    let interval_ms = state.coordinator.interval_ms();
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(config.server.listen).await?;
    tracing::info!("Place server running on http://{}", config.server.listen);
    tracing::info!(
        "   Canvas size: {}x{}, cooldown {} ms, storage {:?}",
        size,
        size,
        interval_ms,
        config.storage.backend
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Place server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
    }
}
