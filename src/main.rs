mod config;
mod error;
mod export;
mod logging;
mod models;
mod scrapers;

use chrono::Utc;
use config::ScrapeConfig;
use scrapers::{HttpFetcher, ListingScraper};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging();

    info!("🏠 San Matías Propiedades - occupancy scraper");

    let config = ScrapeConfig::default();
    let fetcher = HttpFetcher::new(&config)?;
    let scraper = ListingScraper::new(fetcher, config.clone());

    let listings = scraper.scrape_all().await?;

    info!("✅ Scraped {} listings", listings.len());

    for (i, listing) in listings.iter().enumerate() {
        println!("{}. {} ({})", i + 1, listing.name, listing.price);
        if !listing.id.is_empty() {
            println!("   ID: {}", listing.id);
        }
        println!("   Occupied nights: {}", listing.occupation.len());
        println!("   Special prices: {}", listing.special_prices.len());
        println!("   URL: {}", listing.url);
        println!();
    }

    export::write_json(&config.output_json, &listings).await?;
    export::write_calendars(
        &config.calendar_dir,
        &listings,
        config.timezone,
        Utc::now(),
        &config.host()?,
    )
    .await?;

    Ok(())
}
