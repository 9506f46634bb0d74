//! Resilient event publisher
//!
//! The connection to the event stream is created lazily, at most once per
//! process, even when many requests race on first use. Whatever the first
//! attempt produced (a live sink or a failure) is cached for the process
//! lifetime: a failed connection is logged once and never retried.
//!
//! Publishing is fire-and-forget. Without a sink the event is dropped; with
//! one, the send runs on a detached task and its errors are only logged and
//! counted. Nothing here returns an error to the caller.

use crate::error::PublishError;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use telemetry::{IntCounter, MetricRegistry, MetricsError};
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

pub const PUBLISH_FAILURES_TOTAL: &str = "tick_publish_failures_total";

/// A live connection able to deliver payloads to a topic.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn send(&self, topic: &str, payload: Vec<u8>) -> Result<(), PublishError>;
}

/// Builds the [`EventSink`] on first use.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Human readable endpoint, used in logs.
    fn endpoint(&self) -> String;

    async fn connect(&self) -> Result<Arc<dyn EventSink>, PublishError>;
}

/// Observable lifecycle of the cached handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublisherState {
    /// No connection attempt has completed yet.
    Uninitialized,
    Ready,
    Failed,
}

pub struct Publisher {
    connector: Box<dyn Connector>,
    handle: OnceCell<Option<Arc<dyn EventSink>>>,
    dropped: IntCounter,
    serialize_failures: IntCounter,
    send_failures: IntCounter,
}

impl Publisher {
    /// Create a publisher and register its failure counter on `registry`.
    pub fn new(connector: Box<dyn Connector>, registry: &MetricRegistry) -> Result<Self, MetricsError> {
        registry.register_counter(
            PUBLISH_FAILURES_TOTAL,
            "Tick events that were not delivered to the event stream",
            &["reason"],
        )?;

        Ok(Self {
            connector,
            handle: OnceCell::new(),
            dropped: registry.counter(PUBLISH_FAILURES_TOTAL, &[("reason", "no_handle")])?,
            serialize_failures: registry.counter(PUBLISH_FAILURES_TOTAL, &[("reason", "serialize")])?,
            send_failures: registry.counter(PUBLISH_FAILURES_TOTAL, &[("reason", "send")])?,
        })
    }

    pub fn state(&self) -> PublisherState {
        match self.handle.get() {
            None => PublisherState::Uninitialized,
            Some(Some(_)) => PublisherState::Ready,
            Some(None) => PublisherState::Failed,
        }
    }

    /// Resolve the cached sink, connecting on the first call.
    ///
    /// Concurrent first callers share one connection attempt. After it
    /// completes, reads do not lock.
    pub async fn get_or_init(&self) -> Option<Arc<dyn EventSink>> {
        self.handle
            .get_or_init(|| async {
                let endpoint = self.connector.endpoint();
                match self.connector.connect().await {
                    Ok(sink) => {
                        info!(%endpoint, "Connected to event stream");
                        Some(sink)
                    }
                    Err(e) => {
                        error!(%endpoint, error = %e, "Failed to create event stream producer");
                        None
                    }
                }
            })
            .await
            .clone()
    }

    /// Publish `event` to `topic` without waiting for delivery.
    pub async fn publish<T: Serialize>(&self, topic: &str, event: &T) {
        let _ = self.dispatch(topic, event).await;
    }

    /// Returns the detached send task, if one was started.
    pub(crate) async fn dispatch<T: Serialize>(&self, topic: &str, event: &T) -> Option<JoinHandle<()>> {
        let Some(sink) = self.get_or_init().await else {
            debug!(topic, "No event stream handle, dropping event");
            self.dropped.inc();
            return None;
        };

        let payload = match serde_json::to_vec(event) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(topic, error = %e, "Failed to serialize event");
                self.serialize_failures.inc();
                return None;
            }
        };

        let topic = topic.to_string();
        let send_failures = self.send_failures.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = sink.send(&topic, payload).await {
                warn!(%topic, error = %e, "Failed to send event");
                send_failures.inc();
            }
        }))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory connectors for exercising the publisher without a broker.

    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc;

    /// Sink that forwards every payload to a channel.
    pub struct ChannelSink {
        pub tx: mpsc::UnboundedSender<(String, Vec<u8>)>,
    }

    #[async_trait]
    impl EventSink for ChannelSink {
        async fn send(&self, topic: &str, payload: Vec<u8>) -> Result<(), PublishError> {
            let _ = self.tx.send((topic.to_string(), payload));
            Ok(())
        }
    }

    /// Sink whose every send fails.
    pub struct FailingSink;

    #[async_trait]
    impl EventSink for FailingSink {
        async fn send(&self, _topic: &str, _payload: Vec<u8>) -> Result<(), PublishError> {
            Err(PublishError::Send("broker went away".to_string()))
        }
    }

    pub enum Outcome {
        Channel(mpsc::UnboundedSender<(String, Vec<u8>)>),
        FailingSends,
        Refused,
    }

    /// Connector that counts attempts and yields a scripted outcome.
    pub struct ScriptedConnector {
        pub outcome: Outcome,
        pub attempts: Arc<AtomicUsize>,
    }

    impl ScriptedConnector {
        pub fn new(outcome: Outcome) -> (Self, Arc<AtomicUsize>) {
            let attempts = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    outcome,
                    attempts: Arc::clone(&attempts),
                },
                attempts,
            )
        }
    }

    #[async_trait]
    impl Connector for ScriptedConnector {
        fn endpoint(&self) -> String {
            "scripted:9092".to_string()
        }

        async fn connect(&self) -> Result<Arc<dyn EventSink>, PublishError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            // Widen the race window for concurrent first use
            tokio::task::yield_now().await;
            match &self.outcome {
                Outcome::Channel(tx) => Ok(Arc::new(ChannelSink { tx: tx.clone() })),
                Outcome::FailingSends => Ok(Arc::new(FailingSink)),
                Outcome::Refused => Err(PublishError::Connect("connection refused".to_string())),
            }
        }
    }
}
