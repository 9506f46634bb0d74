//! Kafka producer behind the [`Connector`]/[`EventSink`] seam.
//!
//! Records are JSON payloads without a key, written to partition 0 of the
//! topic. Connecting and sending are both bounded by `timeout`, so an
//! unreachable broker fails the attempt instead of stalling it.

use crate::error::PublishError;
use crate::publisher::{Connector, EventSink};
use async_trait::async_trait;
use chrono::Utc;
use rskafka::client::partition::{Compression, PartitionClient, UnknownTopicHandling};
use rskafka::client::{Client, ClientBuilder};
use rskafka::record::Record;
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

const PARTITION: i32 = 0;

pub struct KafkaConnector {
    bootstrap_servers: Vec<String>,
    timeout: Duration,
}

impl KafkaConnector {
    pub fn new(bootstrap_servers: Vec<String>, timeout: Duration) -> Self {
        Self {
            bootstrap_servers,
            timeout,
        }
    }
}

#[async_trait]
impl Connector for KafkaConnector {
    fn endpoint(&self) -> String {
        self.bootstrap_servers.join(",")
    }

    async fn connect(&self) -> Result<Arc<dyn EventSink>, PublishError> {
        if self.bootstrap_servers.is_empty() {
            return Err(PublishError::Connect("no bootstrap servers configured".to_string()));
        }

        let client = tokio::time::timeout(
            self.timeout,
            ClientBuilder::new(self.bootstrap_servers.clone()).build(),
        )
        .await
        .map_err(|_| PublishError::Timeout(self.timeout))??;

        Ok(Arc::new(KafkaSink {
            client,
            partitions: TopicCache::default(),
            timeout: self.timeout,
        }))
    }
}

/// Per-topic values created on first use.
///
/// Creation runs without the lock held, so a slow lookup for one topic never
/// delays topics already cached. When two first uses race, the value inserted
/// first is kept and the other is discarded.
struct TopicCache<T> {
    entries: Mutex<HashMap<String, Arc<T>>>,
}

impl<T> Default for TopicCache<T> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<T> TopicCache<T> {
    async fn get_or_create<F, Fut>(&self, topic: &str, create: F) -> Result<Arc<T>, PublishError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, PublishError>>,
    {
        if let Some(value) = self.entries.lock().await.get(topic) {
            return Ok(Arc::clone(value));
        }

        let created = Arc::new(create().await?);

        let mut entries = self.entries.lock().await;
        let value = entries.entry(topic.to_string()).or_insert(created);
        Ok(Arc::clone(value))
    }
}

struct KafkaSink {
    client: Client,
    partitions: TopicCache<PartitionClient>,
    timeout: Duration,
}

impl KafkaSink {
    async fn partition(&self, topic: &str) -> Result<Arc<PartitionClient>, PublishError> {
        self.partitions
            .get_or_create(topic, || async {
                let client = self
                    .client
                    .partition_client(topic.to_string(), PARTITION, UnknownTopicHandling::Error)
                    .await?;
                Ok::<_, PublishError>(client)
            })
            .await
    }
}

#[async_trait]
impl EventSink for KafkaSink {
    async fn send(&self, topic: &str, payload: Vec<u8>) -> Result<(), PublishError> {
        let record = Record {
            key: None,
            value: Some(payload),
            headers: BTreeMap::new(),
            timestamp: Utc::now(),
        };

        let produce = async {
            let partition = self.partition(topic).await?;
            partition
                .produce(vec![record], Compression::NoCompression)
                .await?;
            Ok::<_, PublishError>(())
        };

        tokio::time::timeout(self.timeout, produce)
            .await
            .map_err(|_| PublishError::Timeout(self.timeout))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_lists_brokers() {
        let connector = KafkaConnector::new(
            vec!["kafka-1:9092".to_string(), "kafka-2:9092".to_string()],
            Duration::from_secs(1),
        );
        assert_eq!(connector.endpoint(), "kafka-1:9092,kafka-2:9092");
    }

    #[tokio::test]
    async fn test_empty_bootstrap_is_refused() {
        let connector = KafkaConnector::new(Vec::new(), Duration::from_secs(1));
        let err = connector.connect().await.err().unwrap();
        assert!(matches!(err, PublishError::Connect(_)));
    }

    #[tokio::test]
    async fn test_unreachable_broker_fails_within_timeout() {
        // Port 9 (discard) on loopback is closed on test hosts
        let connector = KafkaConnector::new(
            vec!["127.0.0.1:9".to_string()],
            Duration::from_millis(300),
        );
        let started = std::time::Instant::now();
        assert!(connector.connect().await.is_err());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_slow_creation_does_not_block_cached_topics() {
        let cache = Arc::new(TopicCache::<u32>::default());
        cache.get_or_create("b", || async { Ok::<_, PublishError>(2) }).await.unwrap();

        let gate = Arc::new(tokio::sync::Notify::new());
        let slow = {
            let cache = Arc::clone(&cache);
            let gate = Arc::clone(&gate);
            tokio::spawn(async move {
                cache
                    .get_or_create("a", || async move {
                        gate.notified().await;
                        Ok::<_, PublishError>(1)
                    })
                    .await
                    .map(|v| *v)
            })
        };
        tokio::task::yield_now().await;

        let hit = tokio::time::timeout(
            Duration::from_secs(1),
            cache.get_or_create("b", || async { Ok::<_, PublishError>(99) }),
        )
        .await
        .expect("cached topic waited on a pending creation")
        .unwrap();
        assert_eq!(*hit, 2);

        gate.notify_one();
        assert_eq!(slow.await.unwrap().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_racing_first_use_keeps_first_insert() {
        let cache = Arc::new(TopicCache::<u32>::default());
        let gate = Arc::new(tokio::sync::Notify::new());
        let late = {
            let cache = Arc::clone(&cache);
            let gate = Arc::clone(&gate);
            tokio::spawn(async move {
                cache
                    .get_or_create("ticks", || async move {
                        gate.notified().await;
                        Ok::<_, PublishError>(1)
                    })
                    .await
                    .map(|v| *v)
            })
        };
        tokio::task::yield_now().await;

        let early = cache.get_or_create("ticks", || async { Ok::<_, PublishError>(2) }).await.unwrap();
        assert_eq!(*early, 2);

        gate.notify_one();
        assert_eq!(late.await.unwrap().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_failed_creation_is_not_cached() {
        let cache = TopicCache::<u32>::default();
        let err = cache
            .get_or_create("ticks", || async {
                Err(PublishError::Send("unknown topic".to_string()))
            })
            .await;
        assert!(err.is_err());

        let value = cache.get_or_create("ticks", || async { Ok::<_, PublishError>(7) }).await.unwrap();
        assert_eq!(*value, 7);
    }
}
