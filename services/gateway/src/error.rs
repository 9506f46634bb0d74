use thiserror::Error;

/// Failure of a call to an upstream service.
///
/// Transport errors, timeouts, non-2xx statuses and undecodable bodies all
/// land here; callers treat them alike.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Invalid upstream URL: {0}")]
    InvalidUrl(String),

    #[error("Upstream request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream body is not JSON: {0}")]
    Decode(#[from] serde_json::Error),
}
