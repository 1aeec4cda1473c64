use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};

use crate::models::{AnalysisSummary, ConcertRecord, SetlistEvent};

/// Event dates arrive as day-month-year text, e.g. "23-08-2019".
pub const EVENT_DATE_FORMAT: &str = "%d-%m-%Y";

/// Records dated before this year never reach a summary.
pub const MIN_EVENT_YEAR: i32 = 2006;

/// Normalization output: the records that parsed plus a count of the ones
/// that did not.
#[derive(Debug)]
pub struct Normalized {
    pub records: Vec<ConcertRecord>,
    pub discarded: usize,
}

/// An aggregate summary together with the filtered rows that back it. The
/// rows are what gets appended to the output CSV.
#[derive(Debug)]
pub struct ArtistAnalysis {
    pub summary: AnalysisSummary,
    pub records: Vec<ConcertRecord>,
}

/// Turns raw API events into concert records. An event without a parseable
/// date is dropped; missing venue fields fall back to "Unknown" placeholders.
pub fn normalize_events(events: &[SetlistEvent]) -> Normalized {
    let mut records = Vec::with_capacity(events.len());
    let mut discarded = 0usize;

    for event in events {
        let date = event
            .event_date
            .as_deref()
            .and_then(|raw| NaiveDate::parse_from_str(raw, EVENT_DATE_FORMAT).ok());
        let Some(date) = date else {
            discarded += 1;
            continue;
        };

        let venue = event.venue.as_ref();
        let city = venue.and_then(|v| v.city.as_ref());
        records.push(ConcertRecord {
            date,
            venue: venue
                .and_then(|v| v.name.clone())
                .unwrap_or_else(|| "Unknown Venue".to_string()),
            city: city
                .and_then(|c| c.name.clone())
                .unwrap_or_else(|| "Unknown City".to_string()),
            country: city
                .and_then(|c| c.country.as_ref())
                .and_then(|c| c.name.clone())
                .unwrap_or_else(|| "Unknown Country".to_string()),
        });
    }

    Normalized { records, discarded }
}

/// Sorts records by date, drops everything before [`MIN_EVENT_YEAR`], and
/// computes the summary. Returns `None` when no record survives.
pub fn analyze(artist_name: &str, mut records: Vec<ConcertRecord>) -> Option<ArtistAnalysis> {
    if records.is_empty() {
        return None;
    }

    records.sort_by_key(|record| record.date);
    records.retain(|record| record.date.year() >= MIN_EVENT_YEAR);

    let first_concert = records.first()?.date;
    let last_concert = records.last()?.date;

    let countries: HashSet<&str> = records.iter().map(|r| r.country.as_str()).collect();
    let cities: HashSet<&str> = records.iter().map(|r| r.city.as_str()).collect();
    let venues: HashSet<&str> = records.iter().map(|r| r.venue.as_str()).collect();

    let summary = AnalysisSummary {
        artist_name: artist_name.to_string(),
        total_concerts: records.len(),
        first_concert,
        last_concert,
        countries_visited: countries.len(),
        cities_visited: cities.len(),
        venues_played: venues.len(),
        // Day span over the average Gregorian year, not calendar-year
        // subtraction.
        years_active: (last_concert - first_concert).num_days() as f64 / 365.25,
    };

    Some(ArtistAnalysis { summary, records })
}
