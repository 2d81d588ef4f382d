//! HTTP error mapping for melody-web
//!
//! Wraps the engine error type and renders every failure as the standard
//! `{"error": {"code", "message"}}` JSON body with a matching status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Engine error, mapped to a status by kind
    #[error(transparent)]
    Engine(#[from] melody_core::Error),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use melody_core::Error;

        let (status, error_code, message) = match self {
            ApiError::Engine(err) => {
                let status = match &err {
                    Error::InvalidPlugin(_) | Error::NoPluginSelected(_) => {
                        StatusCode::BAD_REQUEST
                    }
                    Error::UnknownPlugin(_) => StatusCode::NOT_FOUND,
                    Error::InvalidStage { .. } => StatusCode::CONFLICT,
                    Error::Credential(_) => StatusCode::UNAUTHORIZED,
                    Error::DataFetch(_) => StatusCode::BAD_GATEWAY,
                    Error::Config(_) | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                let code = match &err {
                    Error::InvalidPlugin(_) => "INVALID_PLUGIN",
                    Error::UnknownPlugin(_) => "UNKNOWN_PLUGIN",
                    Error::NoPluginSelected(_) => "NO_PLUGIN_SELECTED",
                    Error::InvalidStage { .. } => "INVALID_STAGE",
                    Error::Credential(_) => "CREDENTIAL_ERROR",
                    Error::DataFetch(_) => "DATA_FETCH_ERROR",
                    Error::Config(_) => "CONFIG_ERROR",
                    Error::Io(_) => "IO_ERROR",
                };
                (status, code, err.to_string())
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg)
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
