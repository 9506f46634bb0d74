//! Command line and environment configuration.

use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "market-data")]
#[command(author, version, about = "Synthetic market tick service", long_about = None)]
pub struct Config {
    /// Address the HTTP server binds to.
    #[arg(long, env = "MARKET_DATA_ADDR", default_value = "0.0.0.0:7001")]
    pub listen_addr: SocketAddr,

    /// Kafka bootstrap servers, comma separated.
    #[arg(
        long,
        env = "KAFKA_BOOTSTRAP_SERVERS",
        default_value = "kafka:9092",
        value_delimiter = ','
    )]
    pub kafka_bootstrap_servers: Vec<String>,

    /// Topic ticks are published to.
    #[arg(long, env = "KAFKA_TICKS_TOPIC", default_value = "ticks")]
    pub ticks_topic: String,

    /// Value of the `source` field on every tick.
    #[arg(long, env = "TICK_SOURCE", default_value = "market-data")]
    pub source: String,

    /// Price the random walk starts from.
    #[arg(long, env = "INITIAL_PRICE", default_value_t = crate::walk::INITIAL_PRICE)]
    pub initial_price: f64,

    /// Upper bound on connecting to and sending to Kafka, in seconds.
    #[arg(long, env = "KAFKA_CONNECT_TIMEOUT_SECS", default_value_t = 5)]
    pub kafka_timeout_secs: u64,
}

impl Config {
    pub fn kafka_timeout(&self) -> Duration {
        Duration::from_secs(self.kafka_timeout_secs)
    }
}
