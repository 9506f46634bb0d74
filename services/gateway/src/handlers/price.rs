use crate::models::{DegradedResponse, PriceQuery};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::{Method, header},
    response::{IntoResponse, Response},
};
use types::tick::DEFAULT_SYMBOL;

/// Relay a price request to market-data.
///
/// A successful upstream body is forwarded byte for byte. An upstream failure
/// is counted and answered with HTTP 200 and
/// `{"error": "Failed to fetch market data"}`.
pub async fn get_price(
    State(state): State<AppState>,
    method: Method,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Response {
    // Resolved inside the tracked future so a rejected query is still counted
    let handler = async {
        let pairs = match query {
            Ok(Query(pairs)) => pairs,
            Err(rejection) => return rejection.into_response(),
        };
        let symbol = PriceQuery::from_pairs(pairs)
            .symbol
            .unwrap_or_else(|| DEFAULT_SYMBOL.to_string());

        match state.market_data.fetch_tick(&symbol).await {
            Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
            Err(e) => {
                tracing::warn!(%symbol, error = %e, "Market data request failed");
                state.market_data_errors.inc();
                Json(DegradedResponse::fetch_failed()).into_response()
            }
        }
    };

    state.tracker.track("/price", &method, handler).await
}
