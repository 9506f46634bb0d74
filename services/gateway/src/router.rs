use crate::handlers::price;
use crate::state::AppState;
use axum::{Router, http::HeaderValue, routing::get};
use std::sync::Arc;
use telemetry::MetricRegistry;
use telemetry::routes::ops_routes;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState, registry: Arc<MetricRegistry>, cors: CorsLayer) -> Router {
    Router::new()
        .route("/price", get(price::get_price))
        .merge(ops_routes(registry))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the listed origins, with credentials.
///
/// Methods and headers mirror the preflight request, since a wildcard cannot
/// be combined with credentials.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
