use crate::error::AppError;
use crate::service::TickService;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::Method,
    response::Response,
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use telemetry::routes::ops_routes;
use telemetry::{MetricRegistry, RequestTracker};
use tower_http::trace::TraceLayer;
use types::tick::Symbol;

#[derive(Clone)]
pub struct AppState {
    pub ticks: Arc<TickService>,
    pub tracker: RequestTracker,
}

/// Query string of `/tick`.
#[derive(Debug, Default, PartialEq)]
pub struct TickQuery {
    pub symbol: Option<String>,
}

impl TickQuery {
    /// Build from raw pairs. A repeated `symbol` keeps its last value.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let symbol = pairs
            .into_iter()
            .filter(|(key, _)| key == "symbol")
            .map(|(_, value)| value)
            .last();
        Self { symbol }
    }
}

pub fn create_router(state: AppState, registry: Arc<MetricRegistry>) -> Router {
    Router::new()
        .route("/tick", get(get_tick))
        .merge(ops_routes(registry))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// The query is resolved inside the tracked handler so a rejected query
// string is still counted.
async fn get_tick(
    State(state): State<AppState>,
    method: Method,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Response {
    let handler = async {
        let Query(pairs) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
        let symbol = TickQuery::from_pairs(pairs)
            .symbol
            .map(Symbol::new)
            .unwrap_or_default();
        let tick = state.ticks.generate_tick(symbol).await?;
        Ok::<_, AppError>(Json(tick))
    };

    state.tracker.track("/tick", &method, handler).await
}
