use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::response::{CooldownResponse, PlaceResponse};
use crate::api::Identity;
use crate::canvas::{png::render_png, Canvas};
use crate::error::PlaceError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PlaceRequest {
    pub x: i64,
    pub y: i64,
    pub color: String,
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn get_canvas(State(state): State<AppState>) -> Result<Json<Canvas>, PlaceError> {
    let canvas = state.coordinator.canvas(state.now_ms()).await?;
    Ok(Json(canvas))
}

pub async fn get_canvas_png(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, PlaceError> {
    let canvas = state.coordinator.canvas(state.now_ms()).await?;
    let png = render_png(&canvas)?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}

pub async fn place_pixel(
    State(state): State<AppState>,
    identity: Identity,
    body: Result<Json<PlaceRequest>, JsonRejection>,
) -> Result<Json<PlaceResponse>, PlaceError> {
    let Json(request) = body.map_err(|e| {
        tracing::warn!("Malformed placement from {}: {}", identity.as_str(), e);
        PlaceError::InvalidInput(e.body_text())
    })?;

    let now = state.now_ms();
    let result = state
        .coordinator
        .place_pixel(identity.as_str(), request.x, request.y, &request.color, now)
        .await;

    match result {
        Ok(cooldown_end) => Ok(Json(PlaceResponse {
            success: true,
            cooldown_end,
        })),
        Err(e) => {
            if !e.is_retryable() {
                tracing::warn!("Rejected placement from {}: {}", identity.as_str(), e);
            }
            Err(e)
        }
    }
}

pub async fn get_cooldown(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<CooldownResponse>, PlaceError> {
    let status = state
        .coordinator
        .cooldown_status(identity.as_str(), state.now_ms())
        .await?;
    Ok(Json(status.into()))
}
