use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "gateway")]
#[command(author, version, about = "Trading API gateway", long_about = None)]
pub struct Config {
    /// Address the HTTP server binds to.
    #[arg(long, env = "GATEWAY_ADDR", default_value = "0.0.0.0:8000")]
    pub listen_addr: SocketAddr,

    /// Base URL of the market-data service.
    #[arg(long, env = "MARKET_DATA_URL", default_value = "http://market-data:7001")]
    pub market_data_url: String,

    /// Timeout for upstream calls, in seconds.
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value_t = 5)]
    pub upstream_timeout_secs: u64,

    /// Origins allowed by CORS, comma separated.
    #[arg(
        long,
        env = "CORS_ORIGINS",
        default_value = "http://localhost:8080,http://127.0.0.1:8080",
        value_delimiter = ','
    )]
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}
