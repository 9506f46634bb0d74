//! Query API client.
//!
//! [`PromApi`] returns raw JSON documents; typing and classification happen
//! in [`crate::classify`]. Tests substitute an in-memory implementation.

use crate::error::FetchError;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub const RUNTIME_INFO_PATH: &str = "/api/v1/status/runtimeinfo";
pub const TARGETS_PATH: &str = "/api/v1/targets";
pub const QUERY_PATH: &str = "/api/v1/query";

#[async_trait]
pub trait PromApi: Send + Sync {
    /// Base URL, used to build the URLs named in diagnostics.
    fn base_url(&self) -> &str;

    async fn runtime_info(&self) -> Result<Value, FetchError>;

    async fn targets(&self) -> Result<Value, FetchError>;

    /// Instant query for `expr`.
    async fn query(&self, expr: &str) -> Result<Value, FetchError>;

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }
}

pub struct HttpPromApi {
    http: Client,
    base_url: String,
}

impl HttpPromApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Request {
                url: base_url.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self { http, base_url })
    }

    async fn get(&self, url: Url) -> Result<Value, FetchError> {
        let shown = url.to_string();
        debug!(url = %shown, "GET");

        let request_failed = |e: reqwest::Error| FetchError::Request {
            url: shown.clone(),
            reason: e.to_string(),
        };

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(request_failed)?
            .error_for_status()
            .map_err(request_failed)?;

        response.json::<Value>().await.map_err(|_| FetchError::Decode {
            url: shown.clone(),
        })
    }

    fn parse(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, FetchError> {
        let raw = self.url_for(path);
        // parse_with_params leaves a bare `?` behind when there are no pairs
        let parsed = if params.is_empty() {
            Url::parse(&raw)
        } else {
            Url::parse_with_params(&raw, params)
        };
        parsed.map_err(|e| FetchError::Request {
            url: raw.clone(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl PromApi for HttpPromApi {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn runtime_info(&self) -> Result<Value, FetchError> {
        self.get(self.parse(RUNTIME_INFO_PATH, &[])?).await
    }

    async fn targets(&self) -> Result<Value, FetchError> {
        self.get(self.parse(TARGETS_PATH, &[])?).await
    }

    async fn query(&self, expr: &str) -> Result<Value, FetchError> {
        self.get(self.parse(QUERY_PATH, &[("query", expr)])?).await
    }
}
