use chrono::NaiveDate;
use serde::Deserialize;

/// Response body of the artist search route. The `artist` key is absent
/// entirely when the query matches nothing.
#[derive(Debug, Deserialize)]
pub struct ArtistSearchResponse {
    #[serde(default)]
    pub artist: Vec<ArtistMatch>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistMatch {
    pub mbid: String,
    pub name: String,
}

/// One page of the per-artist setlists route. `total` is the server-reported
/// total page count; pagination stops once the requested page reaches it.
#[derive(Debug, Deserialize)]
pub struct SetlistPage {
    #[serde(default)]
    pub setlist: Vec<SetlistEvent>,
    #[serde(default)]
    pub total: u32,
}

/// Raw concert record as returned by the API. Everything is optional at the
/// wire level; normalization decides what is required.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetlistEvent {
    pub event_date: Option<String>,
    pub venue: Option<Venue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Venue {
    pub name: Option<String>,
    pub city: Option<City>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct City {
    pub name: Option<String>,
    pub country: Option<Country>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Country {
    pub name: Option<String>,
}

/// A setlist event that survived normalization: parsed date plus location
/// strings with unknown-field fallbacks already applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcertRecord {
    pub date: NaiveDate,
    pub venue: String,
    pub city: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSummary {
    pub artist_name: String,
    pub total_concerts: usize,
    pub first_concert: NaiveDate,
    pub last_concert: NaiveDate,
    pub countries_visited: usize,
    pub cities_visited: usize,
    pub venues_played: usize,
    pub years_active: f64,
}

/// One (artist, date, streams) observation from the chart source CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRow {
    pub artist_name: String,
    pub date: NaiveDate,
    pub streams: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyStreamRow {
    pub artist_name: String,
    pub week: NaiveDate,
    pub streams: u64,
}
