//! Ops endpoints served by every service.
//!
//! - `/metrics` - all registered metrics in text exposition format
//! - `/health` - constant liveness signal, no dependency checks

use crate::registry::{MetricRegistry, CONTENT_TYPE};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

/// Routes for `/metrics` and `/health`, mergeable into any service router.
pub fn ops_routes<S>(registry: Arc<MetricRegistry>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .layer(Extension(registry))
}

async fn metrics_handler(Extension(registry): Extension<Arc<MetricRegistry>>) -> Response {
    match registry.render_all() {
        Ok(body) => ([(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn health_handler() -> Json<HealthStatus> {
    Json(HealthStatus { status: "ok" })
}
