//! Workflow driving routes
//!
//! The thin transport over the engine's operation set. Every driving
//! route responds with a fresh snapshot, so the display layer always
//! renders the state it just produced.

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use melody_core::{Snapshot, TokenMethod};
use serde::Deserialize;

use crate::{ApiResult, AppState};

pub fn melody_routes() -> Router<AppState> {
    Router::new()
        .route("/api/melody", get(snapshot))
        .route("/api/melody/new", post(new_melody))
        .route("/api/melody/plugin", post(select_plugin))
        .route("/api/melody/token", post(submit_token))
        .route("/api/melody/fetch", post(fetch_data))
}

#[derive(Debug, Deserialize)]
struct SelectPluginRequest {
    /// Registration position of the plugin to select
    index: usize,
}

#[derive(Debug, Deserialize)]
struct TokenRequest {
    method: TokenMethod,
    /// Verbatim credential, required for the `custom` method
    token: Option<String>,
}

/// Read the current snapshot without driving the workflow.
async fn snapshot(State(state): State<AppState>) -> Json<Snapshot> {
    Json(state.engine.read().await.snapshot())
}

/// Start a new session, clearing selection, credential, and records.
async fn new_melody(State(state): State<AppState>) -> Json<Snapshot> {
    let mut engine = state.engine.write().await;
    engine.reset();
    Json(engine.snapshot())
}

/// Select a data plugin by registry position.
async fn select_plugin(
    State(state): State<AppState>,
    Json(request): Json<SelectPluginRequest>,
) -> ApiResult<Json<Snapshot>> {
    let mut engine = state.engine.write().await;
    engine.select_plugin_at(request.index)?;
    Ok(Json(engine.snapshot()))
}

/// Resolve the session credential with the requested method.
async fn submit_token(
    State(state): State<AppState>,
    Json(request): Json<TokenRequest>,
) -> ApiResult<Json<Snapshot>> {
    let mut engine = state.engine.write().await;
    engine
        .set_access_token(request.method, request.token.as_deref())
        .await?;
    Ok(Json(engine.snapshot()))
}

/// Fetch the collection from the selected plugin.
async fn fetch_data(State(state): State<AppState>) -> ApiResult<Json<Snapshot>> {
    let mut engine = state.engine.write().await;
    engine.fetch_data().await?;
    Ok(Json(engine.snapshot()))
}
