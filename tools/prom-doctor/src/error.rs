use thiserror::Error;

/// A single GET against the query API failed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FetchError {
    #[error("Failed to GET {url}: {reason}")]
    Request { url: String, reason: String },

    #[error("Failed to parse JSON from {url}")]
    Decode { url: String },
}

/// Errors that end the run.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Could not reach Prometheus or bad response from /status/runtimeinfo")]
    Unreachable,

    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
}
