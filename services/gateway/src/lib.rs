//! Trading API gateway
//!
//! Relays `GET /price` to the market-data service's `/tick` endpoint. Every
//! request is tracked; upstream failures are counted and answered with a
//! degraded body instead of an error status.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;
pub mod upstream;
