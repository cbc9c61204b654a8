use crate::error::ScrapeError;
use anyhow::Result;
use scraper::{Html, Selector};
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::debug;
use url::Url;

/// JSON envelope returned by the search endpoint
#[derive(Debug, Deserialize)]
struct SearchResponse {
    /// Rendered result cards
    result: String,
}

/// Resolve a link against `base` and drop its query string and fragment.
/// Only http(s) links survive.
pub fn canonicalize_url(base: &Url, href: &str) -> Option<String> {
    let mut url = match base.join(href.trim()) {
        Ok(url) => url,
        Err(e) => {
            debug!("Skipping unparseable link '{}': {}", href, e);
            return None;
        }
    };

    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    url.set_query(None);
    url.set_fragment(None);
    Some(url.to_string())
}

/// Canonicalize, deduplicate and sort a batch of links
pub fn canonical_set<'a>(
    base: &Url,
    links: impl IntoIterator<Item = &'a str>,
) -> BTreeSet<String> {
    links
        .into_iter()
        .filter(|link| !link.trim().is_empty())
        .filter_map(|link| canonicalize_url(base, link))
        .collect()
}

/// Detail page links from a search response body
pub fn parse_search_response(base: &Url, body: &str) -> Result<BTreeSet<String>> {
    let response: SearchResponse = serde_json::from_str(body)
        .map_err(|e| ScrapeError::InvalidSearchResponse(e.to_string()))?;

    let fragment = Html::parse_fragment(&response.result);
    let link_selector = Selector::parse("a[href]")
        .map_err(|e| ScrapeError::InvalidSearchResponse(format!("{:?}", e)))?;

    let urls = canonical_set(
        base,
        fragment
            .select(&link_selector)
            .filter_map(|link| link.value().attr("href")),
    );
    debug!("Search response linked {} unique pages", urls.len());

    Ok(urls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base() -> Url {
        Url::parse("https://site.test/alquiler/").unwrap()
    }

    #[test]
    fn query_strings_are_stripped_and_deduplicated() {
        let html = r#"
            <div class="item"><a href="https://site.test/alquiler/foo/?x=1">Foo</a></div>
            <div class="item"><a href="https://site.test/alquiler/foo/?y=2">Ver</a></div>
            <div class="item"><a href="https://site.test/alquiler/bar/">Bar</a></div>
        "#;
        let body = json!({ "result": html }).to_string();

        let urls: Vec<_> = parse_search_response(&base(), &body)
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(
            urls,
            vec!["https://site.test/alquiler/bar/", "https://site.test/alquiler/foo/"]
        );
    }

    #[test]
    fn equivalent_urls_collapse_to_one() {
        let set = canonical_set(
            &base(),
            ["https://SITE.test:443/a/?x=1", "https://site.test/a/?y=2", "/a/#calendario"],
        );
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec!["https://site.test/a/"]);
    }

    #[test]
    fn relative_links_resolve_against_base() {
        let set = canonical_set(&base(), ["casa-azul/?ref=map", "mailto:info@site.test", " "]);
        assert_eq!(
            set.into_iter().collect::<Vec<_>>(),
            vec!["https://site.test/alquiler/casa-azul/"]
        );
    }

    #[test]
    fn empty_result_is_not_an_error() {
        let body = json!({ "result": "<p>Sin resultados</p>" }).to_string();
        assert!(parse_search_response(&base(), &body).unwrap().is_empty());
    }

    #[test]
    fn unparseable_body_is_fatal() {
        assert!(parse_search_response(&base(), "<html>error</html>").is_err());
        assert!(parse_search_response(&base(), r#"{"success": false}"#).is_err());
    }

    #[test]
    fn canonical_set_sorts() {
        let set = canonical_set(&base(), ["https://site.test/b/?q", "https://site.test/a/"]);
        assert_eq!(
            set.into_iter().collect::<Vec<_>>(),
            vec!["https://site.test/a/", "https://site.test/b/"]
        );
    }
}
