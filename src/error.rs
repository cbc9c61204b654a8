use thiserror::Error;

/// Failures that abort a scrape run
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("request to {url} failed with status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("search response could not be parsed: {0}")]
    InvalidSearchResponse(String),

    #[error("no calendar element found on {url}")]
    MissingCalendarElement { url: String },

    #[error("no weekly price found on {url}")]
    MissingPrice { url: String },
}
