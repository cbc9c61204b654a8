use serde::{Deserialize, Serialize};

/// Form payload posted to the rental search endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParams {
    /// WordPress AJAX action handling the map search
    pub action: String,
    /// Availability window, empty for "any"
    pub start_date: String,
    pub end_date: String,
    pub adults: u32,
    pub childrens: u32,
    pub beds: u32,
    /// Sort direction (`ASC` / `DESC`)
    pub order: String,
    /// Sort field
    pub orderby: String,
    /// Page size; large enough to get every listing in one response
    pub per_page: u32,
    pub booking_on_page: String,
    /// JSON-encoded taxonomy filters
    pub taxonomies: String,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            action: "ovabrw_search_map".to_string(),
            start_date: String::new(),
            end_date: String::new(),
            adults: 1,
            childrens: 1,
            beds: 1,
            order: "DESC".to_string(),
            orderby: "date".to_string(),
            per_page: 100,
            booking_on_page: "no".to_string(),
            taxonomies: "[]".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_form_matches_search_submission() {
        let form = serde_json::to_value(SearchParams::default()).unwrap();
        assert_eq!(
            form,
            json!({
                "action": "ovabrw_search_map",
                "start_date": "",
                "end_date": "",
                "adults": 1,
                "childrens": 1,
                "beds": 1,
                "order": "DESC",
                "orderby": "date",
                "per_page": 100,
                "booking_on_page": "no",
                "taxonomies": "[]"
            })
        );
    }
}
