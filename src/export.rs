use crate::models::ApartmentListing;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use icalendar::{Calendar, Component, Event, EventLike};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Pretty-printed (two-space) JSON array of listings
pub fn listings_to_json(listings: &[ApartmentListing]) -> Result<String> {
    serde_json::to_string_pretty(listings).context("Failed to serialize listings")
}

pub async fn write_json(path: &Path, listings: &[ApartmentListing]) -> Result<()> {
    let json = listings_to_json(listings)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!("💾 Saved {} listings to {}", listings.len(), path.display());
    Ok(())
}

/// One all-day event per occupied night, summary set to the listing name
pub fn build_calendar(
    listing: &ApartmentListing,
    timezone: Tz,
    stamp: DateTime<Utc>,
    host: &str,
) -> Calendar {
    let uid_base = if listing.id.is_empty() {
        listing.slug()
    } else {
        listing.id.clone()
    };

    let mut calendar = Calendar::new();
    calendar.name(&listing.name).timezone(timezone.name());

    for (n, date) in listing.occupation.iter().enumerate() {
        let uid = format!("{}-{}-{}@{}", uid_base, date.format("%Y%m%d"), n, host);
        let event = Event::new()
            .summary(&listing.name)
            .starts(*date)
            .ends(*date)
            .timestamp(stamp)
            .uid(&uid)
            .done();
        calendar.push(event);
    }

    calendar.done()
}

pub fn calendar_path(dir: &Path, listing: &ApartmentListing) -> PathBuf {
    dir.join(format!("{}.ics", listing.slug()))
}

/// Write `<name>.ics` for every listing into `dir`, creating it if needed.
/// Listings whose names sanitize to the same file overwrite each other; the
/// last one wins and a warning is logged.
pub async fn write_calendars(
    dir: &Path,
    listings: &[ApartmentListing],
    timezone: Tz,
    stamp: DateTime<Utc>,
    host: &str,
) -> Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let mut written = Vec::with_capacity(listings.len());
    let mut seen = HashSet::new();
    for listing in listings {
        let path = calendar_path(dir, listing);
        if !seen.insert(path.clone()) {
            warn!(
                "{} already written for another listing, overwriting with {}",
                path.display(),
                listing.url
            );
        }
        let calendar = build_calendar(listing, timezone, stamp, host);

        tokio::fs::write(&path, calendar.to_string())
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!("Wrote {} events to {}", listing.occupation.len(), path.display());

        written.push(path);
    }

    info!("📅 Saved {} calendars to {}", written.len(), dir.display());
    Ok(written)
}
