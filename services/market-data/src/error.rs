use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use types::errors::TickError;

/// Failures of the event stream connection. Never reach a request.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Broker error: {0}")]
    Broker(#[from] rskafka::client::error::Error),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Connect failed: {0}")]
    Connect(String),

    #[error("Send failed: {0}")]
    Send(String),
}

/// Errors surfaced by the `/tick` endpoint
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl From<TickError> for AppError {
    fn from(e: TickError) -> Self {
        AppError::InternalError(e.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, code) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, "BAD_REQUEST"),
            AppError::InternalError(e) => {
                tracing::error!(error = %e, "Tick generation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    "INTERNAL_ERROR",
                )
            }
        };

        let body = Json(json!({
            "error": code,
            "message": error_message
        }));

        (status, body).into_response()
    }
}
