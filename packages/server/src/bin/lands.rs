// Entry point for the land registry service

use anyhow::{Context, Result};
use market_core::server::bootstrap::{connect, init_tracing, serve};
use market_core::server::{build_lands_app, LandsState};
use market_core::Config;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    tracing::info!("Starting lands service");

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    let pool = connect(&config).await?;
    let app = build_lands_app(LandsState::new(pool));

    tracing::info!("Health check: http://localhost:{}/api/lands/health", config.port);
    serve(app, config.port).await
}
