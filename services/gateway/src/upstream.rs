use crate::error::UpstreamError;
use axum::body::Bytes;
use reqwest::{Client, Url};
use serde::de::IgnoredAny;
use std::time::Duration;

/// Upstream label used on `api_upstream_errors_total`.
pub const MARKET_DATA_UPSTREAM: &str = "market-data";

/// HTTP client for the market-data service.
#[derive(Clone)]
pub struct MarketDataClient {
    http: Client,
    base_url: String,
}

impl MarketDataClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, UpstreamError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// `GET {base}/tick?symbol=..`, returning the body bytes untouched.
    ///
    /// The body is checked to be JSON but never re-encoded, so key order and
    /// number formatting reach the caller as market-data wrote them.
    pub async fn fetch_tick(&self, symbol: &str) -> Result<Bytes, UpstreamError> {
        let url = Url::parse_with_params(&format!("{}/tick", self.base_url), &[("symbol", symbol)])
            .map_err(|e| UpstreamError::InvalidUrl(e.to_string()))?;

        let body = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        serde_json::from_slice::<IgnoredAny>(&body)?;

        Ok(body)
    }
}
