//! melody-web library interface for testing
//!
//! Exposes the router, application state, and configuration for
//! integration tests.

pub mod api;
pub mod config;
pub mod error;
pub mod plugins;
pub mod sentiment;

pub use crate::error::{ApiError, ApiResult};

use std::sync::Arc;

use axum::Router;
use melody_core::WorkflowEngine;
use tokio::sync::RwLock;

/// Application state shared across handlers
///
/// One workflow engine per process; all driving operations take the write
/// lock, the snapshot read path takes the read lock.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RwLock<WorkflowEngine>>,
}

impl AppState {
    pub fn new(engine: WorkflowEngine) -> Self {
        Self {
            engine: Arc::new(RwLock::new(engine)),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::melody_routes())
        .merge(api::health_routes())
        .with_state(state)
}
