// Entry point for the marketplace listing service

use anyhow::{Context, Result};
use market_core::server::bootstrap::{connect, init_tracing, serve};
use market_core::server::{build_market_app, MarketState};
use market_core::Config;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    tracing::info!("Starting marketplace service");

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        request_timeout_ms = config.request_timeout.as_millis() as u64,
        "Configuration loaded"
    );

    let pool = connect(&config).await?;
    let state = MarketState::postgres(pool.clone(), config.request_timeout);
    let app = build_market_app(state, pool);

    tracing::info!("Health check: http://localhost:{}/api/market/health", config.port);
    serve(app, config.port).await
}
