//! Bounded random walk behind the synthetic price.
//!
//! `next = max(floor, last + U[-half_range, +half_range))`. The last price is
//! the only shared mutable state of the service; reads and writes go through
//! one mutex so concurrent ticks never lose an update.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};

/// Starting price of a fresh walk.
pub const INITIAL_PRICE: f64 = 100.0;

/// The walk never goes below this price.
pub const PRICE_FLOOR: f64 = 1.0;

/// Largest absolute step per tick.
pub const HALF_RANGE: f64 = 0.25;

struct WalkState {
    last_price: f64,
    rng: StdRng,
}

pub struct RandomWalk {
    state: Mutex<WalkState>,
    floor: f64,
    half_range: f64,
}

impl RandomWalk {
    pub fn new(initial_price: f64) -> Self {
        Self::with_rng(initial_price, StdRng::from_entropy())
    }

    /// Deterministic walk for replays and tests.
    pub fn with_seed(initial_price: f64, seed: u64) -> Self {
        Self::with_rng(initial_price, StdRng::seed_from_u64(seed))
    }

    fn with_rng(initial_price: f64, rng: StdRng) -> Self {
        Self {
            state: Mutex::new(WalkState {
                last_price: initial_price.max(PRICE_FLOOR),
                rng,
            }),
            floor: PRICE_FLOOR,
            half_range: HALF_RANGE,
        }
    }

    /// Advance one step and return the new price.
    pub fn step(&self) -> f64 {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let change = state.rng.gen_range(-self.half_range..self.half_range);
        state.last_price = (state.last_price + change).max(self.floor);
        state.last_price
    }

    pub fn last_price(&self) -> f64 {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last_price
    }
}

impl Default for RandomWalk {
    fn default() -> Self {
        Self::new(INITIAL_PRICE)
    }
}
