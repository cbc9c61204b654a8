//! Decoders for the JSON blobs the booking plugin embeds in HTML attributes.
//!
//! Every attribute is decoded independently. The price table is the only one
//! without a fallback; absent or malformed override and occupancy feeds
//! collapse to empty results with a warning.

use chrono::{Local, NaiveDate, TimeZone};
use scraper::Html;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Cell of the weekly price table holding the Monday daily rate
const MONDAY_RATE_KEY: &str = "ovabrw_daily_monday";

/// Text content of an HTML fragment, ASCII whitespace collapsed.
/// Non-breaking spaces are part of the displayed text and are kept.
pub fn html_text(fragment: &str) -> String {
    let document = Html::parse_fragment(fragment);
    let text: String = document.root_element().text().collect();
    collapse_whitespace(&text)
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_ascii_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a page title like `12 - Depto Sol` into `(id, name)`.
///
/// Splits on the first hyphen or en-dash. A title without either yields an
/// empty id and the whole title as the name.
pub fn split_title(title: &str) -> (String, String) {
    let title = title.trim();
    match title.char_indices().find(|(_, c)| *c == '-' || *c == '–') {
        Some((idx, sep)) => {
            let id = title[..idx].trim();
            let name = title[idx + sep.len_utf8()..].trim();
            (id.to_string(), name.to_string())
        }
        None => {
            warn!("Title '{}' has no id separator, using it as the name", title);
            (String::new(), title.to_string())
        }
    }
}

/// Monday rate from the `price_calendar` attribute.
///
/// The table is a list of rows (or a PHP object keyed by row number); row 1
/// maps weekday keys to HTML snippets such as `<span>$</span>5.000`.
pub fn parse_weekly_price(raw: Option<&str>) -> Option<String> {
    let table: Value = match serde_json::from_str(raw?) {
        Ok(table) => table,
        Err(e) => {
            warn!("Weekly price table is not valid JSON: {}", e);
            return None;
        }
    };

    let row = table.get(1).or_else(|| table.get("1"))?;
    let text = match row.get(MONDAY_RATE_KEY)? {
        Value::String(cell) => html_text(cell),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    (!text.is_empty()).then_some(text)
}

/// Decoded `data-special-time` attribute
#[derive(Debug, Clone, PartialEq)]
pub enum SpecialPriceFeed {
    /// Label (HTML) -> list of Unix timestamps
    Overrides(Map<String, Value>),
    Absent,
    Malformed(String),
}

impl SpecialPriceFeed {
    pub fn decode(raw: Option<&str>) -> Self {
        let raw = match raw.map(str::trim) {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Self::Absent,
        };

        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Self::Overrides(map),
            // PHP encodes an empty associative array as `[]`
            Ok(Value::Array(items)) if items.is_empty() => Self::Absent,
            Ok(Value::Null) => Self::Absent,
            Ok(other) => Self::Malformed(format!("expected an object, got {}", other)),
            Err(e) => Self::Malformed(e.to_string()),
        }
    }
}

/// Local calendar date of a Unix timestamp
pub fn timestamp_to_local_date(timestamp: i64) -> Option<NaiveDate> {
    Local
        .timestamp_opt(timestamp, 0)
        .single()
        .map(|moment| moment.date_naive())
}

/// Unix timestamp rendered as `YYYY-MM-DD` in the local zone
pub fn format_timestamp(timestamp: i64) -> Option<String> {
    timestamp_to_local_date(timestamp).map(|date| date.format("%Y-%m-%d").to_string())
}

fn timestamp_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn parse_special_prices(feed: SpecialPriceFeed) -> BTreeMap<String, Vec<String>> {
    let overrides = match feed {
        SpecialPriceFeed::Overrides(map) => map,
        SpecialPriceFeed::Absent => {
            debug!("No special prices");
            return BTreeMap::new();
        }
        SpecialPriceFeed::Malformed(reason) => {
            warn!("Ignoring malformed special prices: {}", reason);
            return BTreeMap::new();
        }
    };

    let mut special_prices = BTreeMap::new();
    for (label, timestamps) in overrides {
        let Value::Array(timestamps) = timestamps else {
            warn!("Special price '{}' has no timestamp list, skipping", label);
            continue;
        };

        let dates = timestamps
            .iter()
            .filter_map(|value| {
                let formatted = timestamp_value(value).and_then(format_timestamp);
                if formatted.is_none() {
                    warn!("Skipping invalid special price timestamp {}", value);
                }
                formatted
            })
            .collect();

        special_prices.insert(html_text(&label), dates);
    }

    special_prices
}

/// Decoded `order_time` attribute
#[derive(Debug, Clone, PartialEq)]
pub enum OccupancyFeed {
    /// Calendar events, booked or free
    Events(Vec<Value>),
    Absent,
    Malformed(String),
    NotAList,
}

impl OccupancyFeed {
    pub fn decode(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::Absent;
        };

        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(events)) => Self::Events(events),
            Ok(_) => Self::NotAList,
            Err(e) => Self::Malformed(e.to_string()),
        }
    }
}

/// Truthiness of a `backgroundColor` marker: set means booked
fn is_marked(marker: Option<&Value>) -> bool {
    match marker {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(color)) => !color.is_empty(),
        Some(Value::Number(n)) => n.as_f64().map_or(true, |f| f != 0.0),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(fields)) => !fields.is_empty(),
    }
}

/// Date part of a `start` field such as `2024-03-10 00:00:00`
fn start_date(start: &str) -> Option<NaiveDate> {
    let day = start
        .trim()
        .split(|c: char| c == ' ' || c == 'T')
        .next()
        .unwrap_or_default();
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Booked dates from a list of calendar events, ascending, duplicates kept
pub fn parse_occupation_events(events: &[Value]) -> Vec<NaiveDate> {
    let mut occupation = Vec::new();

    for event in events {
        if !is_marked(event.get("backgroundColor")) {
            continue;
        }

        match event.get("start").and_then(Value::as_str).and_then(start_date) {
            Some(date) => occupation.push(date),
            None => warn!("Skipping booked entry without a usable start date: {}", event),
        }
    }

    occupation.sort();
    occupation
}

pub fn normalize_occupancy(feed: OccupancyFeed) -> Vec<NaiveDate> {
    match feed {
        OccupancyFeed::Events(events) => parse_occupation_events(&events),
        OccupancyFeed::Absent => {
            warn!("No occupancy feed, nothing occupied");
            Vec::new()
        }
        OccupancyFeed::Malformed(reason) => {
            warn!("Occupancy feed is not valid JSON ({}), nothing occupied", reason);
            Vec::new()
        }
        OccupancyFeed::NotAList => {
            warn!("Occupancy feed is not a list, nothing occupied");
            Vec::new()
        }
    }
}

/// Raw `order_time` attribute to booked dates
pub fn parse_occupations(raw: Option<&str>) -> Vec<NaiveDate> {
    normalize_occupancy(OccupancyFeed::decode(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn drops_unmarked_entries_and_sorts() {
        let raw = r##"[{"backgroundColor":"#f00","start":"2024-03-10 00:00:00"},
                      {"backgroundColor":"","start":"2024-03-11"},
                      {"backgroundColor":"#f00","start":"2024-03-09"}]"##;

        assert_eq!(
            parse_occupations(Some(raw)),
            vec![date(2024, 3, 9), date(2024, 3, 10)]
        );
    }

    #[test]
    fn output_is_sorted_for_shuffled_input() {
        let events: Vec<Value> = [17, 3, 28, 3, 11, 1, 30, 9]
            .iter()
            .map(|day| {
                json!({
                    "backgroundColor": "#d00",
                    "start": format!("2024-04-{:02} 12:00:00", day)
                })
            })
            .collect();

        let occupation = parse_occupation_events(&events);
        assert_eq!(occupation.len(), 8);
        assert!(occupation.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn duplicates_are_preserved() {
        let events = vec![
            json!({"backgroundColor": "#f00", "start": "2024-01-05"}),
            json!({"backgroundColor": "#0f0", "start": "2024-01-05 10:00:00"}),
        ];
        assert_eq!(parse_occupation_events(&events), vec![date(2024, 1, 5), date(2024, 1, 5)]);
    }

    #[test]
    fn marker_presence_decides_occupancy() {
        let events = vec![
            json!({"start": "2024-02-01"}),
            json!({"backgroundColor": null, "start": "2024-02-02"}),
            json!({"backgroundColor": false, "start": "2024-02-03"}),
            json!({"backgroundColor": 0, "start": "2024-02-04"}),
            json!({"backgroundColor": "x", "start": "2024-02-05"}),
            json!({"backgroundColor": true, "start": "2024-02-06"}),
            json!({"backgroundColor": 1, "start": "2024-02-07T00:00:00"}),
        ];

        assert_eq!(
            parse_occupation_events(&events),
            vec![date(2024, 2, 5), date(2024, 2, 6), date(2024, 2, 7)]
        );
    }

    #[test]
    fn booked_entry_without_valid_start_is_skipped() {
        let events = vec![
            json!({"backgroundColor": "#f00"}),
            json!({"backgroundColor": "#f00", "start": "soon"}),
            json!({"backgroundColor": "#f00", "start": "2024-05-01"}),
        ];
        assert_eq!(parse_occupation_events(&events), vec![date(2024, 5, 1)]);
    }

    #[test]
    fn malformed_feed_means_nothing_occupied() {
        assert!(parse_occupations(Some("")).is_empty());
        assert!(parse_occupations(Some("[{")).is_empty());
        assert!(parse_occupations(Some("{\"a\": 1}")).is_empty());
        assert!(parse_occupations(None).is_empty());
        assert_eq!(OccupancyFeed::decode(None), OccupancyFeed::Absent);
        assert!(matches!(OccupancyFeed::decode(Some("")), OccupancyFeed::Malformed(_)));
        assert_eq!(OccupancyFeed::decode(Some("false")), OccupancyFeed::NotAList);
        assert!(normalize_occupancy(OccupancyFeed::Absent).is_empty());
    }

    #[test]
    fn timestamp_formats_as_local_date() {
        // 2024-03-10T12:00:00Z is still March 10 from UTC-11 to UTC+11
        assert_eq!(format_timestamp(1_710_072_000).as_deref(), Some("2024-03-10"));
        assert_eq!(timestamp_to_local_date(1_710_072_000), Some(date(2024, 3, 10)));
    }

    #[test]
    fn special_prices_convert_timestamps_and_strip_label_markup() {
        let raw = json!({
            "<strong>Semana Santa</strong>": ["1711929600", 1712016000, "nope"],
            "Verano": "1711929600",
        })
        .to_string();

        let prices = parse_special_prices(SpecialPriceFeed::decode(Some(&raw)));
        assert_eq!(prices.len(), 1);
        assert_eq!(
            prices["Semana Santa"],
            vec![format_timestamp(1_711_929_600).unwrap(), format_timestamp(1_712_016_000).unwrap()]
        );
    }

    #[test]
    fn missing_or_broken_special_prices_are_empty() {
        assert_eq!(SpecialPriceFeed::decode(None), SpecialPriceFeed::Absent);
        assert_eq!(SpecialPriceFeed::decode(Some("[]")), SpecialPriceFeed::Absent);
        assert_eq!(SpecialPriceFeed::decode(Some("  ")), SpecialPriceFeed::Absent);
        assert!(matches!(SpecialPriceFeed::decode(Some("{oops")), SpecialPriceFeed::Malformed(_)));
        assert!(matches!(SpecialPriceFeed::decode(Some("[1]")), SpecialPriceFeed::Malformed(_)));
        assert!(parse_special_prices(SpecialPriceFeed::decode(Some("{oops"))).is_empty());
    }

    #[test]
    fn weekly_price_reads_monday_cell_text() {
        let raw = json!([
            {"ovabrw_daily_monday": "ignored"},
            {"ovabrw_daily_monday": "<span class=\"amount\"><span>$</span>45.000</span>"}
        ])
        .to_string();
        assert_eq!(parse_weekly_price(Some(&raw)).as_deref(), Some("$45.000"));

        let keyed = json!({"1": {"ovabrw_daily_monday": 3000}}).to_string();
        assert_eq!(parse_weekly_price(Some(&keyed)).as_deref(), Some("3000"));
    }

    #[test]
    fn weekly_price_missing_cell_is_none() {
        assert_eq!(parse_weekly_price(None), None);
        assert_eq!(parse_weekly_price(Some("not json")), None);
        assert_eq!(parse_weekly_price(Some("[{}]")), None);
        assert_eq!(parse_weekly_price(Some(r#"[{}, {"ovabrw_daily_tuesday": "1"}]"#)), None);
    }

    #[test]
    fn title_splits_on_first_separator() {
        for (title, id, name) in [
            ("12 - Depto Sol", "12", "Depto Sol"),
            ("A3 – Casa del Mar", "A3", "Casa del Mar"),
            ("7-Vista - Norte", "7", "Vista - Norte"),
        ] {
            assert_eq!(split_title(title), (id.to_string(), name.to_string()));
        }
    }

    #[test]
    fn title_without_separator_becomes_name() {
        assert_eq!(
            split_title("  Cabaña Los Pinos "),
            (String::new(), "Cabaña Los Pinos".to_string())
        );
    }

    #[test]
    fn html_text_collapses_whitespace() {
        assert_eq!(html_text("<p>  Semana \n <b>Santa</b></p>"), "Semana Santa");
        assert_eq!(html_text("plain"), "plain");
    }

    #[test]
    fn html_text_keeps_non_breaking_spaces() {
        assert_eq!(html_text("<span>$&nbsp;12.500</span>"), "$\u{a0}12.500");
        assert_eq!(html_text("<span> $\u{a0} 12.500 </span>"), "$\u{a0} 12.500");
    }
}
