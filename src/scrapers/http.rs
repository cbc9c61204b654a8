use crate::config::ScrapeConfig;
use crate::error::ScrapeError;
use crate::scrapers::traits::PageFetcher;
use crate::scrapers::types::SearchParams;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client, Response};
use tracing::{debug, warn};

/// reqwest-backed fetcher impersonating a desktop browser
pub struct HttpFetcher {
    client: Client,
    origin: String,
    referer: String,
}

impl HttpFetcher {
    pub fn new(config: &ScrapeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            origin: config.base()?.origin().ascii_serialization(),
            referer: config.search_referer()?.to_string(),
        })
    }

    async fn read_body(url: &str, response: Response) -> Result<String> {
        let status = response.status();
        if !status.is_success() {
            warn!("{} returned status: {}", url, status);
            return Err(ScrapeError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))?;
        debug!("Downloaded {} bytes from {}", body.len(), url);
        Ok(body)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn get(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;

        Self::read_body(url, response).await
    }

    async fn post_form(&self, url: &str, params: &SearchParams) -> Result<String> {
        debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .header(header::ACCEPT, "*/*")
            .header(
                header::ACCEPT_LANGUAGE,
                "es-US,es;q=0.9,es-419;q=0.8,en;q=0.7,en-US;q=0.6",
            )
            .header(header::ORIGIN, self.origin.as_str())
            .header(header::REFERER, self.referer.as_str())
            .header("x-requested-with", "XMLHttpRequest")
            .form(params)
            .send()
            .await
            .with_context(|| format!("Failed to post search form to {}", url))?;

        Self::read_body(url, response).await
    }
}
