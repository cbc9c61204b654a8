use crate::scrapers::types::SearchParams;
use anyhow::Result;
use async_trait::async_trait;

/// Transport used by the scraping pipeline
/// Everything above this seam only sees response bodies, so tests can serve pages from memory
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// GET a page and return its body; non-2xx statuses are errors
    async fn get(&self, url: &str) -> Result<String>;

    /// POST the search form (form-encoded) and return the response body
    async fn post_form(&self, url: &str, params: &SearchParams) -> Result<String>;
}
