use clap::Parser;
use market_data::config::Config;
use market_data::kafka::KafkaConnector;
use market_data::publisher::Publisher;
use market_data::routes::{create_router, AppState};
use market_data::service::TickService;
use market_data::walk::RandomWalk;
use std::sync::Arc;
use telemetry::{MetricRegistry, RequestTracker};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    telemetry::logging::init_tracing();
    let config = Config::parse();

    tracing::info!("Starting Market Data service");

    let registry = Arc::new(MetricRegistry::new());
    let tracker = RequestTracker::new(Arc::clone(&registry))?;

    let connector = KafkaConnector::new(config.kafka_bootstrap_servers.clone(), config.kafka_timeout());
    let publisher = Arc::new(Publisher::new(Box::new(connector), &registry)?);

    // Connect early so the first tick does not pay for it
    publisher.get_or_init().await;

    let ticks = TickService::new(
        RandomWalk::new(config.initial_price),
        publisher,
        config.ticks_topic.clone(),
        config.source.clone(),
        &registry,
    )?;

    let state = AppState {
        ticks: Arc::new(ticks),
        tracker,
    };
    let app = create_router(state, registry);

    let listener = TcpListener::bind(config.listen_addr).await?;
    tracing::info!(topic = %config.ticks_topic, "Listening on {}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(telemetry::signal::shutdown_signal())
        .await?;

    Ok(())
}
