use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One apartment detail page and everything extracted from it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApartmentListing {
    pub url: String,
    pub id: String,
    pub name: String,
    /// Monday daily rate as displayed on the site, currency symbol included
    pub price: String,
    /// Date-range label -> override dates formatted as `YYYY-MM-DD`
    pub special_prices: BTreeMap<String, Vec<String>>,
    /// Booked nights, ascending, duplicates preserved
    pub occupation: Vec<NaiveDate>,
}

impl ApartmentListing {
    /// Name used for calendar files and event UIDs
    pub fn slug(&self) -> String {
        let base = if !self.name.trim().is_empty() {
            self.name.trim()
        } else if !self.id.trim().is_empty() {
            self.id.trim()
        } else {
            "listing"
        };

        base.chars()
            .map(|c| {
                if c.is_whitespace() || c == '/' || c == '\\' {
                    '_'
                } else {
                    c
                }
            })
            .collect()
    }
}
