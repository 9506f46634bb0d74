use thiserror::Error;

/// Errors raised by the metric registry.
///
/// `LabelMismatch` and `UnknownMetric` are programming errors: the label
/// schema of every metric is fixed at registration.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Metric not registered: {name}")]
    UnknownMetric { name: String },

    #[error("Metric already registered: {name}")]
    Duplicate { name: String },

    #[error("Metric {name} is a {actual}, not a {requested}")]
    KindMismatch {
        name: String,
        actual: &'static str,
        requested: &'static str,
    },

    #[error("Label mismatch for {name}: expected {expected:?}, got {got:?}")]
    LabelMismatch {
        name: String,
        expected: Vec<String>,
        got: Vec<String>,
    },

    #[error("Prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),

    #[error("Exposition output is not UTF-8: {0}")]
    Encode(#[from] std::string::FromUtf8Error),
}
