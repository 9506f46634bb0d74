use clap::Parser;
use gateway::config::Config;
use gateway::router::{cors_layer, create_router};
use gateway::state::AppState;
use std::sync::Arc;
use telemetry::MetricRegistry;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Initialize tracing
    telemetry::logging::init_tracing();
    let config = Config::parse();

    tracing::info!("Starting Gateway API service");

    // Initialize application state
    let registry = Arc::new(MetricRegistry::new());
    let state = AppState::new(
        Arc::clone(&registry),
        &config.market_data_url,
        config.upstream_timeout(),
    )?;

    // Create router
    let app = create_router(state, registry, cors_layer(&config.cors_origins));

    // Bind and serve
    let listener = TcpListener::bind(config.listen_addr).await?;

    tracing::info!(upstream = %config.market_data_url, "Listening on {}", config.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(telemetry::signal::shutdown_signal())
        .await?;

    Ok(())
}
