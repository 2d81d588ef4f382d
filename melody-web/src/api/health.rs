//! Health and status endpoints

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use serde_json::json;

use crate::AppState;

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/status", get(status))
}

/// Health check endpoint
async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Status endpoint
async fn status(State(state): State<AppState>) -> Json<serde_json::Value> {
    let engine = state.engine.read().await;
    Json(json!({
        "service": "melody-web",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "registered_plugins": engine.registry().len(),
        "stage": engine.stage(),
    }))
}
