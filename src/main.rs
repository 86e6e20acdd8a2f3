mod config;
mod districts;
mod models;
mod runner;
mod scrapers;

use config::{AppConfig, CONFIG_FILE};
use districts::{DistrictCache, DistrictResolver};
use runner::Runner;
use scrapers::{OfferExtractor, OtodomClient};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr, stdout carries the report
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    info!("🏠 Flat Scout");

    let config = AppConfig::load(CONFIG_FILE)?;
    let client = OtodomClient::new(&config.base_url, &config.user_agent)?;

    let resolver = DistrictResolver::new(&client);
    let cache = DistrictCache::new(&config.cache_path);
    let resolutions = cache.load_or_populate(&resolver, &config.districts).await?;
    info!("Tracking {} districts", resolutions.len());

    let runner = Runner::new(
        &client,
        OfferExtractor::new()?,
        config.search.clone(),
        config.since_days,
    );
    let mut stdout = std::io::stdout().lock();
    runner.run(&resolutions, &mut stdout).await?;

    Ok(())
}
