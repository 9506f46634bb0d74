//! Instrumentation shared by the market-data services
//!
//! - `registry`: process-wide counters/histograms keyed by label sets
//! - `tracker`: request wrapper that always records latency and outcome
//! - `routes`: `/metrics` and `/health` endpoints
//! - `logging`: tracing subscriber initialization
//! - `signal`: graceful shutdown trigger

pub mod error;
pub mod logging;
pub mod registry;
pub mod routes;
pub mod signal;
pub mod tracker;

pub use error::MetricsError;
pub use prometheus::{Histogram, IntCounter};
pub use registry::MetricRegistry;
pub use tracker::RequestTracker;
