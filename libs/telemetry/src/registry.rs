//! Process-wide metric registry
//!
//! Wraps a `prometheus::Registry` and remembers, for every metric name, the
//! label keys it was registered with. Lookups must name exactly those keys;
//! anything else is a `LabelMismatch`.
//!
//! The registry is built once at process start and handed to every component
//! that records metrics, so `/metrics` always renders the same state the
//! handlers write to.

use crate::error::MetricsError;
use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Histogram buckets for durations in seconds.
pub const DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0,
];

/// Content type of the text exposition format.
pub const CONTENT_TYPE: &str = prometheus::TEXT_FORMAT;

enum Family {
    Counter(IntCounterVec),
    Histogram(HistogramVec),
}

impl Family {
    fn kind(&self) -> &'static str {
        match self {
            Family::Counter(_) => "counter",
            Family::Histogram(_) => "histogram",
        }
    }
}

struct Entry {
    label_keys: Vec<String>,
    family: Family,
}

/// Counters and histograms keyed by `(name, label set)`.
///
/// Accumulators are atomic; the same `(name, label values)` always resolves to
/// the same underlying series. Series are never evicted.
pub struct MetricRegistry {
    registry: Registry,
    families: RwLock<HashMap<String, Entry>>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            families: RwLock::new(HashMap::new()),
        }
    }

    /// Register a counter family with a fixed label schema.
    pub fn register_counter(
        &self,
        name: &str,
        help: &str,
        label_keys: &[&str],
    ) -> Result<(), MetricsError> {
        let vec = IntCounterVec::new(Opts::new(name, help), label_keys)?;
        self.insert(name, label_keys, Family::Counter(vec.clone()), Box::new(vec))
    }

    /// Register a histogram family with [`DURATION_BUCKETS`].
    pub fn register_histogram(
        &self,
        name: &str,
        help: &str,
        label_keys: &[&str],
    ) -> Result<(), MetricsError> {
        let opts = HistogramOpts::new(name, help).buckets(DURATION_BUCKETS.to_vec());
        let vec = HistogramVec::new(opts, label_keys)?;
        self.insert(name, label_keys, Family::Histogram(vec.clone()), Box::new(vec))
    }

    fn insert(
        &self,
        name: &str,
        label_keys: &[&str],
        family: Family,
        collector: Box<dyn prometheus::core::Collector>,
    ) -> Result<(), MetricsError> {
        let mut families = self.families.write().unwrap_or_else(PoisonError::into_inner);
        if families.contains_key(name) {
            return Err(MetricsError::Duplicate {
                name: name.to_string(),
            });
        }
        self.registry.register(collector)?;
        families.insert(
            name.to_string(),
            Entry {
                label_keys: label_keys.iter().map(|k| k.to_string()).collect(),
                family,
            },
        );
        Ok(())
    }

    /// Resolve the counter series for `labels`.
    pub fn counter(&self, name: &str, labels: &[(&str, &str)]) -> Result<IntCounter, MetricsError> {
        let families = self.families.read().unwrap_or_else(PoisonError::into_inner);
        let entry = lookup(&families, name)?;
        let values = ordered_values(name, &entry.label_keys, labels)?;
        match &entry.family {
            Family::Counter(vec) => Ok(vec.get_metric_with_label_values(&values)?),
            other => Err(MetricsError::KindMismatch {
                name: name.to_string(),
                actual: other.kind(),
                requested: "counter",
            }),
        }
    }

    /// Resolve the histogram series for `labels`.
    pub fn histogram(&self, name: &str, labels: &[(&str, &str)]) -> Result<Histogram, MetricsError> {
        let families = self.families.read().unwrap_or_else(PoisonError::into_inner);
        let entry = lookup(&families, name)?;
        let values = ordered_values(name, &entry.label_keys, labels)?;
        match &entry.family {
            Family::Histogram(vec) => Ok(vec.get_metric_with_label_values(&values)?),
            other => Err(MetricsError::KindMismatch {
                name: name.to_string(),
                actual: other.kind(),
                requested: "histogram",
            }),
        }
    }

    /// Render every registered family in the text exposition format.
    ///
    /// Each series is read atomically; the snapshot is not atomic across series.
    pub fn render_all(&self) -> Result<String, MetricsError> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn lookup<'a>(families: &'a HashMap<String, Entry>, name: &str) -> Result<&'a Entry, MetricsError> {
    families.get(name).ok_or_else(|| MetricsError::UnknownMetric {
        name: name.to_string(),
    })
}

/// Order label values by the registered key schema, requiring an exact key match.
fn ordered_values<'a>(
    name: &str,
    label_keys: &[String],
    labels: &[(&str, &'a str)],
) -> Result<Vec<&'a str>, MetricsError> {
    let mismatch = || MetricsError::LabelMismatch {
        name: name.to_string(),
        expected: label_keys.to_vec(),
        got: labels.iter().map(|(k, _)| k.to_string()).collect(),
    };

    if labels.len() != label_keys.len() {
        return Err(mismatch());
    }

    label_keys
        .iter()
        .map(|key| {
            let mut matches = labels.iter().filter(|(k, _)| k == key);
            match (matches.next(), matches.next()) {
                (Some((_, value)), None) => Ok(*value),
                _ => Err(mismatch()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn registry() -> MetricRegistry {
        let registry = MetricRegistry::new();
        registry
            .register_counter("requests_total", "Requests", &["endpoint", "status"])
            .unwrap();
        registry
            .register_histogram("latency_seconds", "Latency", &["endpoint"])
            .unwrap();
        registry
    }

    #[test]
    fn test_counter_increment() {
        let registry = registry();
        let c = registry
            .counter("requests_total", &[("endpoint", "/price"), ("status", "200")])
            .unwrap();
        c.inc();
        c.inc();
        assert_eq!(c.get(), 2);
    }

    #[test]
    fn test_same_labels_resolve_to_same_series() {
        let registry = registry();
        registry
            .counter("requests_total", &[("endpoint", "/price"), ("status", "200")])
            .unwrap()
            .inc();
        // Key order does not matter, only the key set
        let again = registry
            .counter("requests_total", &[("status", "200"), ("endpoint", "/price")])
            .unwrap();
        assert_eq!(again.get(), 1);
    }

    #[test]
    fn test_label_mismatch() {
        let registry = registry();

        let missing = registry.counter("requests_total", &[("endpoint", "/price")]);
        assert!(matches!(missing, Err(MetricsError::LabelMismatch { .. })));

        let wrong_key = registry.counter("requests_total", &[("endpoint", "/price"), ("code", "200")]);
        assert!(matches!(wrong_key, Err(MetricsError::LabelMismatch { .. })));

        let repeated = registry.counter("requests_total", &[("endpoint", "a"), ("endpoint", "b")]);
        assert!(matches!(repeated, Err(MetricsError::LabelMismatch { .. })));
    }

    #[test]
    fn test_unknown_and_kind_mismatch() {
        let registry = registry();
        assert!(matches!(
            registry.counter("nope", &[]),
            Err(MetricsError::UnknownMetric { .. })
        ));
        assert!(matches!(
            registry.counter("latency_seconds", &[("endpoint", "/x")]),
            Err(MetricsError::KindMismatch { .. })
        ));
    }

    #[test]
    fn test_duplicate_registration() {
        let registry = registry();
        let err = registry.register_counter("requests_total", "again", &["endpoint", "status"]);
        assert!(matches!(err, Err(MetricsError::Duplicate { .. })));
    }

    #[test]
    fn test_unlabelled_metric() {
        let registry = MetricRegistry::new();
        registry.register_counter("ticks_total", "Ticks", &[]).unwrap();
        registry.counter("ticks_total", &[]).unwrap().inc();
        assert_eq!(registry.counter("ticks_total", &[]).unwrap().get(), 1);
    }

    #[test]
    fn test_render_all() {
        let registry = registry();
        registry
            .counter("requests_total", &[("endpoint", "/price"), ("status", "200")])
            .unwrap()
            .inc();
        registry
            .histogram("latency_seconds", &[("endpoint", "/price")])
            .unwrap()
            .observe(0.02);

        let text = registry.render_all().unwrap();
        assert!(text.contains("# TYPE requests_total counter"));
        assert!(text.contains(r#"requests_total{endpoint="/price",status="200"} 1"#));
        assert!(text.contains(r#"latency_seconds_bucket{endpoint="/price",le="0.025"} 1"#));
        assert!(text.contains(r#"latency_seconds_count{endpoint="/price"} 1"#));
    }

    #[test]
    fn test_concurrent_increments_are_not_lost() {
        let registry = Arc::new(registry());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        registry
                            .counter("requests_total", &[("endpoint", "/tick"), ("status", "200")])
                            .unwrap()
                            .inc();
                        let _ = registry.render_all().unwrap();
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        let c = registry
            .counter("requests_total", &[("endpoint", "/tick"), ("status", "200")])
            .unwrap();
        assert_eq!(c.get(), 8000);
    }
}
