//! Tick generation
//!
//! One tick = one walk step, rounded to four digits, published to the event
//! stream and returned to the caller. The returned payload does not depend on
//! whether the publish went through.

use crate::publisher::Publisher;
use crate::walk::RandomWalk;
use std::sync::Arc;
use std::time::Instant;
use telemetry::{Histogram, IntCounter, MetricRegistry, MetricsError};
use types::errors::TickError;
use types::tick::{Symbol, TickEvent};

pub const PRICE_TICKS_TOTAL: &str = "price_ticks_total";
pub const PRICE_TICK_LATENCY_SECONDS: &str = "price_tick_latency_seconds";

pub struct TickService {
    walk: RandomWalk,
    publisher: Arc<Publisher>,
    topic: String,
    source: String,
    ticks_total: IntCounter,
    tick_latency: Histogram,
}

impl TickService {
    pub fn new(
        walk: RandomWalk,
        publisher: Arc<Publisher>,
        topic: impl Into<String>,
        source: impl Into<String>,
        registry: &MetricRegistry,
    ) -> Result<Self, MetricsError> {
        registry.register_counter(PRICE_TICKS_TOTAL, "Total number of price ticks generated", &[])?;
        registry.register_histogram(
            PRICE_TICK_LATENCY_SECONDS,
            "Latency for generating price ticks",
            &[],
        )?;

        Ok(Self {
            walk,
            publisher,
            topic: topic.into(),
            source: source.into(),
            ticks_total: registry.counter(PRICE_TICKS_TOTAL, &[])?,
            tick_latency: registry.histogram(PRICE_TICK_LATENCY_SECONDS, &[])?,
        })
    }

    /// Advance the walk and publish the resulting tick.
    pub async fn generate_tick(&self, symbol: Symbol) -> Result<TickEvent, TickError> {
        let started = Instant::now();
        let price = self.walk.step();
        self.ticks_total.inc();
        self.tick_latency.observe(started.elapsed().as_secs_f64());

        let tick = TickEvent::new(symbol, price, self.source.as_str())?;
        self.publisher.publish(&self.topic, &tick).await;
        Ok(tick)
    }

    pub fn last_price(&self) -> f64 {
        self.walk.last_price()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publisher::testing::{Outcome, ScriptedConnector};
    use crate::publisher::PublisherState;
    use crate::walk::{HALF_RANGE, INITIAL_PRICE, PRICE_FLOOR};
    use tokio::sync::mpsc;

    fn service(outcome: Outcome, registry: &MetricRegistry) -> TickService {
        service_with_publisher(outcome, registry).0
    }

    fn service_with_publisher(
        outcome: Outcome,
        registry: &MetricRegistry,
    ) -> (TickService, Arc<Publisher>) {
        let (connector, _) = ScriptedConnector::new(outcome);
        let publisher = Arc::new(Publisher::new(Box::new(connector), registry).unwrap());
        let service = TickService::new(
            RandomWalk::with_seed(INITIAL_PRICE, 11),
            Arc::clone(&publisher),
            "ticks",
            "market-data",
            registry,
        )
        .unwrap();
        (service, publisher)
    }

    #[tokio::test]
    async fn test_tick_is_published() {
        let registry = MetricRegistry::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let service = service(Outcome::Channel(tx), &registry);

        let tick = service.generate_tick(Symbol::new("BTC")).await.unwrap();
        assert_eq!(tick.symbol.as_str(), "BTC");
        assert_eq!(tick.source, "market-data");

        let (topic, payload) = rx.recv().await.unwrap();
        assert_eq!(topic, "ticks");
        let published: TickEvent = serde_json::from_slice(&payload).unwrap();
        assert_eq!(published, tick);
    }

    #[tokio::test]
    async fn test_tick_survives_publisher_faults() {
        for outcome in [Outcome::Refused, Outcome::FailingSends] {
            let registry = MetricRegistry::new();
            let (service, publisher) = service_with_publisher(outcome, &registry);
            for _ in 0..10 {
                let tick = service.generate_tick(Symbol::default()).await.unwrap();
                assert!(tick.price >= PRICE_FLOOR);
            }
            assert_ne!(publisher.state(), PublisherState::Uninitialized);
            assert_eq!(registry.counter(PRICE_TICKS_TOTAL, &[]).unwrap().get(), 10);
        }
    }

    #[tokio::test]
    async fn test_price_is_rounded_and_bounded() {
        let registry = MetricRegistry::new();
        let service = service(Outcome::Refused, &registry);
        let n = 200;
        for _ in 0..n {
            let tick = service.generate_tick(Symbol::default()).await.unwrap();
            let scaled = tick.price * 10_000.0;
            assert!((scaled - scaled.round()).abs() < 1e-6);
        }
        let last = service.last_price();
        assert!(last >= PRICE_FLOOR);
        assert!(last <= INITIAL_PRICE + n as f64 * HALF_RANGE + 1e-6);
        assert_eq!(
            registry
                .histogram(PRICE_TICK_LATENCY_SECONDS, &[])
                .unwrap()
                .get_sample_count(),
            n
        );
    }
}
