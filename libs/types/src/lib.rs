//! Types library for the market-data services
//!
//! Payload types shared between the tick generator, the relay gateway and
//! their tests. Everything here is plain data with serde derives.
//!
//! # Modules
//! - `tick`: Tick events, symbols and price rounding
//! - `errors`: Error taxonomy

// Public modules
pub mod tick;
pub mod errors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::tick::*;
    pub use crate::errors::*;
}
