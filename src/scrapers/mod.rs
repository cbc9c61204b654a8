pub mod discovery;
pub mod http;
pub mod listing;
pub mod parse;
pub mod traits;
pub mod types;

pub use http::HttpFetcher;
pub use listing::ListingScraper;
