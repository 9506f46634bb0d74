use crate::upstream::{MARKET_DATA_UPSTREAM, MarketDataClient};
use std::sync::Arc;
use std::time::Duration;
use telemetry::{IntCounter, MetricRegistry, RequestTracker};

pub const UPSTREAM_ERRORS_TOTAL: &str = "api_upstream_errors_total";

#[derive(Clone)]
pub struct AppState {
    pub tracker: RequestTracker,
    pub market_data: MarketDataClient,
    pub market_data_errors: IntCounter,
}

impl AppState {
    /// Register the gateway metrics on `registry` and build the upstream client.
    pub fn new(
        registry: Arc<MetricRegistry>,
        market_data_url: &str,
        upstream_timeout: Duration,
    ) -> Result<Self, anyhow::Error> {
        registry.register_counter(
            UPSTREAM_ERRORS_TOTAL,
            "Total number of upstream (market data / strategy) errors",
            &["upstream"],
        )?;
        let market_data_errors =
            registry.counter(UPSTREAM_ERRORS_TOTAL, &[("upstream", MARKET_DATA_UPSTREAM)])?;

        Ok(Self {
            tracker: RequestTracker::new(registry)?,
            market_data: MarketDataClient::new(market_data_url, upstream_timeout)?,
            market_data_errors,
        })
    }
}
