//! Tick payloads
//!
//! A tick is one synthetic price observation. It is built once per request,
//! never mutated afterwards, and handed to the event publisher by value.

use crate::errors::TickError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Symbol used when a request does not name one.
pub const DEFAULT_SYMBOL: &str = "FAKE";

/// Number of fractional digits kept on published prices.
pub const PRICE_SCALE: i32 = 4;

/// Instrument symbol as passed on the query string.
///
/// Taken verbatim: an empty `symbol=` yields an empty symbol, not the default.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    /// Get the symbol string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Symbol {
    fn default() -> Self {
        Self(DEFAULT_SYMBOL.to_string())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Round a price to [`PRICE_SCALE`] fractional digits, half away from zero.
pub fn round_price(price: f64) -> f64 {
    let factor = 10f64.powi(PRICE_SCALE);
    (price * factor).round() / factor
}

/// One synthetic price observation.
///
/// Field order matches the wire payload: `{"symbol", "price", "source"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickEvent {
    pub symbol: Symbol,
    pub price: f64,
    pub source: String,
}

impl TickEvent {
    /// Build a tick, rounding the price to [`PRICE_SCALE`] digits.
    pub fn new(symbol: Symbol, price: f64, source: impl Into<String>) -> Result<Self, TickError> {
        if !price.is_finite() {
            return Err(TickError::NonFinitePrice(price));
        }
        Ok(Self {
            symbol,
            price: round_price(price),
            source: source.into(),
        })
    }
}
