use crate::config::ScrapeConfig;
use crate::error::ScrapeError;
use crate::models::ApartmentListing;
use crate::scrapers::discovery::{canonical_set, parse_search_response};
use crate::scrapers::parse::{
    collapse_whitespace, parse_occupations, parse_special_prices, parse_weekly_price, split_title,
    SpecialPriceFeed,
};
use crate::scrapers::traits::PageFetcher;
use anyhow::{anyhow, Result};
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use tracing::{debug, info};

const CALENDAR_SELECTOR: &str = "div.ovabrw__product_calendar";
const TITLE_SELECTOR: &str = "h1.header_title";

const PRICE_ATTR: &str = "price_calendar";
const SPECIAL_PRICE_ATTR: &str = "data-special-time";
const ORDER_ATTR: &str = "order_time";

fn selector(css: &'static str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("Invalid selector {}: {:?}", css, e))
}

/// Assemble a listing record from a fetched detail page
pub fn parse_listing_page(url: &str, html: &str) -> Result<ApartmentListing> {
    let document = Html::parse_document(html);

    let title = document
        .select(&selector(TITLE_SELECTOR)?)
        .next()
        .map(|heading| collapse_whitespace(&heading.text().collect::<String>()))
        .unwrap_or_default();
    let (id, name) = split_title(&title);

    let calendar = document
        .select(&selector(CALENDAR_SELECTOR)?)
        .next()
        .ok_or_else(|| ScrapeError::MissingCalendarElement {
            url: url.to_string(),
        })?;
    let attrs = calendar.value();

    let price = parse_weekly_price(attrs.attr(PRICE_ATTR)).ok_or_else(|| {
        ScrapeError::MissingPrice {
            url: url.to_string(),
        }
    })?;

    let special_feed = SpecialPriceFeed::decode(attrs.attr(SPECIAL_PRICE_ATTR));
    let special_prices = parse_special_prices(special_feed);
    let occupation = parse_occupations(attrs.attr(ORDER_ATTR));

    debug!(
        "{}: {} special prices, {} occupied nights",
        url,
        special_prices.len(),
        occupation.len()
    );

    Ok(ApartmentListing {
        url: url.to_string(),
        id,
        name,
        price,
        special_prices,
        occupation,
    })
}

/// Sequential scraper for the rental site: discover detail pages, then extract each
pub struct ListingScraper<F> {
    fetcher: F,
    config: ScrapeConfig,
}

impl<F: PageFetcher> ListingScraper<F> {
    pub fn new(fetcher: F, config: ScrapeConfig) -> Self {
        Self { fetcher, config }
    }

    /// Detail page URLs, from the configured list or a search submission
    pub async fn discover_urls(&self) -> Result<BTreeSet<String>> {
        let base = self.config.base()?;

        if !self.config.detail_urls.is_empty() {
            info!("Using {} configured listing URLs", self.config.detail_urls.len());
            let configured = self.config.detail_urls.iter().map(String::as_str);
            return Ok(canonical_set(&base, configured));
        }

        let endpoint = self.config.search_endpoint()?;
        info!("Searching listings at {}", endpoint);

        let body = self
            .fetcher
            .post_form(endpoint.as_str(), &self.config.search)
            .await?;
        let urls = parse_search_response(&base, &body)?;

        info!("Found {} listing pages", urls.len());
        Ok(urls)
    }

    /// Fetch one detail page and extract its record
    pub async fn scrape_item(&self, url: &str) -> Result<ApartmentListing> {
        info!("Processing {}", url);
        let html = self.fetcher.get(url).await?;
        parse_listing_page(url, &html)
    }

    /// Run the whole pipeline; the first failing page aborts the run
    pub async fn scrape_all(&self) -> Result<Vec<ApartmentListing>> {
        let urls = self.discover_urls().await?;

        let mut listings = Vec::with_capacity(urls.len());
        for url in &urls {
            listings.push(self.scrape_item(url).await?);
        }

        Ok(listings)
    }
}
