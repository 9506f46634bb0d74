//! Request tracking
//!
//! [`RequestTracker::track`] wraps one unit of request handling. Whatever
//! happens inside (a normal response, an error turned into a response, a
//! panic, or the future being dropped mid-flight) the elapsed time goes into
//! `api_request_duration_seconds{endpoint,method}` and exactly one increment
//! goes into `api_requests_total{endpoint,method,status}`.
//!
//! Recording lives in a drop guard, so it runs on every exit path. When the
//! handler never produced a response the status is recorded as `500`.

use crate::error::MetricsError;
use crate::registry::MetricRegistry;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

pub const REQUESTS_TOTAL: &str = "api_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "api_request_duration_seconds";

#[derive(Clone)]
pub struct RequestTracker {
    registry: Arc<MetricRegistry>,
}

impl RequestTracker {
    /// Register the request metrics on `registry`.
    pub fn new(registry: Arc<MetricRegistry>) -> Result<Self, MetricsError> {
        registry.register_counter(
            REQUESTS_TOTAL,
            "Total number of API requests",
            &["endpoint", "method", "status"],
        )?;
        registry.register_histogram(
            REQUEST_DURATION_SECONDS,
            "Latency of API requests in seconds",
            &["endpoint", "method"],
        )?;
        Ok(Self { registry })
    }

    pub fn registry(&self) -> &Arc<MetricRegistry> {
        &self.registry
    }

    /// Run `handler` and record its duration and status.
    pub async fn track<F, R>(&self, endpoint: &str, method: &Method, handler: F) -> Response
    where
        F: Future<Output = R>,
        R: IntoResponse,
    {
        let mut in_flight = InFlight {
            tracker: self,
            endpoint,
            method: method.as_str(),
            started: Instant::now(),
            status: None,
        };

        let response = handler.await.into_response();
        in_flight.status = Some(response.status());
        response
    }

    fn record(&self, endpoint: &str, method: &str, status: StatusCode, elapsed_secs: f64) {
        match self.registry.histogram(
            REQUEST_DURATION_SECONDS,
            &[("endpoint", endpoint), ("method", method)],
        ) {
            Ok(histogram) => histogram.observe(elapsed_secs),
            Err(e) => tracing::error!(error = %e, "request duration not recorded"),
        }

        let status = status.as_u16().to_string();
        match self.registry.counter(
            REQUESTS_TOTAL,
            &[("endpoint", endpoint), ("method", method), ("status", &status)],
        ) {
            Ok(counter) => counter.inc(),
            Err(e) => tracing::error!(error = %e, "request count not recorded"),
        }
    }
}

/// Records the request when dropped.
struct InFlight<'a> {
    tracker: &'a RequestTracker,
    endpoint: &'a str,
    method: &'a str,
    started: Instant,
    status: Option<StatusCode>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let status = self.status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let elapsed = self.started.elapsed().as_secs_f64();
        self.tracker.record(self.endpoint, self.method, status, elapsed);
    }
}
