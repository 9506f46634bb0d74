//! Error types for tick payloads

use thiserror::Error;

/// Errors raised while building tick payloads
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TickError {
    #[error("Price is not finite: {0}")]
    NonFinitePrice(f64),
}
