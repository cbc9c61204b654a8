use crate::scrapers::types::SearchParams;
use anyhow::{anyhow, Context, Result};
use chrono_tz::Tz;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Everything a scrape run needs; all values are fixed for this deployment
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Site root
    pub base_url: String,
    pub search: SearchParams,
    /// Explicit detail pages; when non-empty, search discovery is skipped
    pub detail_urls: Vec<String>,
    pub output_json: PathBuf,
    pub calendar_dir: PathBuf,
    /// Zone the exported calendars are declared in
    pub timezone: Tz,
    pub user_agent: String,
    pub timeout: Duration,
}

impl ScrapeConfig {
    pub fn base(&self) -> Result<Url> {
        Url::parse(&self.base_url).with_context(|| format!("Invalid base URL {}", self.base_url))
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base()?
            .join(path)
            .with_context(|| format!("Invalid path {} under {}", path, self.base_url))
    }

    pub fn search_endpoint(&self) -> Result<Url> {
        self.endpoint("/wp-admin/admin-ajax.php")
    }

    pub fn search_referer(&self) -> Result<Url> {
        self.endpoint("/alquiler/")
    }

    /// Host name of `base_url`, used to qualify calendar UIDs
    pub fn host(&self) -> Result<String> {
        let base = self.base()?;
        base.host_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("Base URL {} has no host", self.base_url))
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.sanmatiaspropiedades.com.ar".to_string(),
            search: SearchParams::default(),
            detail_urls: Vec::new(),
            output_json: PathBuf::from("sanmatiaspropiedades.json"),
            calendar_dir: PathBuf::from("."),
            timezone: chrono_tz::America::Argentina::Buenos_Aires,
            user_agent: concat!(
                "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 ",
                "(KHTML, like Gecko) Chrome/100.0.4896.127 Safari/537.36"
            )
            .to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}
