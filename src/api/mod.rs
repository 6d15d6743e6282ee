pub mod handlers;
pub mod identity;
pub mod response;

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub use identity::Identity;

/// Build the HTTP surface over the shared state
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/canvas",
            get(handlers::get_canvas).post(handlers::place_pixel),
        )
        .route("/api/canvas.png", get(handlers::get_canvas_png))
        .route("/api/canvas/cooldown", get(handlers::get_cooldown))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
