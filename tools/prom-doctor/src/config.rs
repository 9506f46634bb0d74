use clap::Parser;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "prom-doctor")]
#[command(author, version, about = "Check that Prometheus is scraping the trading services", long_about = None)]
pub struct Config {
    /// Base URL of the Prometheus server.
    #[arg(long, env = "PROM_URL", default_value = "http://localhost:9091")]
    pub prom_url: String,

    /// Jobs whose `up` series are checked, comma separated.
    #[arg(
        long,
        env = "PROM_DOCTOR_JOBS",
        default_value = "market-data,strategy-engine,api-gateway",
        value_delimiter = ','
    )]
    pub jobs: Vec<String>,

    /// Metrics that must have samples, comma separated.
    #[arg(
        long,
        env = "PROM_DOCTOR_METRICS",
        default_value = "strategy_last_price,strategy_trades_total,api_requests_total,api_request_duration_seconds_bucket",
        value_delimiter = ','
    )]
    pub metrics: Vec<String>,

    /// `host:port` scrape targets Prometheus is expected to reach, comma
    /// separated. Named in the summary's network hint.
    #[arg(
        long,
        env = "PROM_DOCTOR_TARGETS",
        default_value = "market-data:7001,strategy-engine:7002,api-gateway:8000",
        value_delimiter = ','
    )]
    pub expected_targets: Vec<String>,

    /// Per-request timeout, in seconds.
    #[arg(long, env = "PROM_TIMEOUT_SECS", default_value_t = 5)]
    pub timeout_secs: u64,
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
