use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::path::Path;

use anyhow::Context;
use chrono::{Datelike, Duration, NaiveDate};

use crate::models::{AnalysisSummary, ChartRow, ConcertRecord, WeeklyStreamRow};

/// Fixed column order of the cumulative analysis file. Summary fields are
/// broadcast onto every detail row.
pub const ANALYSIS_COLUMNS: [&str; 12] = [
    "artist_name",
    "date",
    "venue",
    "city",
    "country",
    "total_concerts",
    "first_concert",
    "last_concert",
    "countries_visited",
    "cities_visited",
    "venues_played",
    "years_active",
];

pub const WEEKLY_COLUMNS: [&str; 3] = ["artist_name", "week", "streams"];

/// Chart source dates are ISO, unlike the day-first API dates.
pub const CHART_DATE_FORMAT: &str = "%Y-%m-%d";

/// Appends one analysis to the cumulative CSV. Writes the header only when
/// the file did not exist yet, so repeated runs for different artists grow a
/// single table. Returns the number of data rows written.
pub fn append_analysis(
    path: &Path,
    summary: &AnalysisSummary,
    records: &[ConcertRecord],
) -> anyhow::Result<usize> {
    let file_exists = path.exists();
    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut writer = csv::Writer::from_writer(file);

    if !file_exists {
        writer.write_record(ANALYSIS_COLUMNS)?;
    }

    for record in records {
        writer.write_record([
            summary.artist_name.clone(),
            record.date.to_string(),
            record.venue.clone(),
            record.city.clone(),
            record.country.clone(),
            summary.total_concerts.to_string(),
            summary.first_concert.to_string(),
            summary.last_concert.to_string(),
            summary.countries_visited.to_string(),
            summary.cities_visited.to_string(),
            summary.venues_played.to_string(),
            summary.years_active.to_string(),
        ])?;
    }

    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(records.len())
}

#[derive(Debug)]
pub struct ReshapeOutcome {
    pub rows_read: usize,
    pub rows_dropped: usize,
    pub rows_written: usize,
}

/// Loads chart rows from CSV, dropping rows whose date does not parse.
/// Accepts `artist_name`, `artists`, or `artist` as the artist column.
pub fn load_chart_rows(path: &Path) -> anyhow::Result<(Vec<ChartRow>, usize)> {
    #[derive(serde::Deserialize)]
    struct RawChartRow {
        #[serde(alias = "artists", alias = "artist")]
        artist_name: String,
        date: String,
        streams: u64,
    }

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut rows = Vec::new();
    let mut dropped = 0usize;

    for result in reader.deserialize::<RawChartRow>() {
        let raw = result?;
        match NaiveDate::parse_from_str(&raw.date, CHART_DATE_FORMAT) {
            Ok(date) => rows.push(ChartRow {
                artist_name: raw.artist_name,
                date,
                streams: raw.streams,
            }),
            Err(_) => dropped += 1,
        }
    }

    Ok((rows, dropped))
}

/// The Monday on or before the given date.
pub fn monday_week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Sums streams per (artist, Monday-anchored week). Output is sorted by
/// artist then week.
pub fn group_weekly(rows: &[ChartRow]) -> Vec<WeeklyStreamRow> {
    let mut totals: BTreeMap<(String, NaiveDate), u64> = BTreeMap::new();

    for row in rows {
        let key = (row.artist_name.clone(), monday_week_start(row.date));
        *totals.entry(key).or_insert(0) += row.streams;
    }

    totals
        .into_iter()
        .map(|((artist_name, week), streams)| WeeklyStreamRow {
            artist_name,
            week,
            streams,
        })
        .collect()
}

/// Writes the weekly aggregate, replacing any existing file.
pub fn write_weekly_streams(path: &Path, rows: &[WeeklyStreamRow]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writer.write_record(WEEKLY_COLUMNS)?;

    for row in rows {
        writer.write_record([
            row.artist_name.clone(),
            row.week.to_string(),
            row.streams.to_string(),
        ])?;
    }

    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(())
}

pub fn reshape_charts(input: &Path, output: &Path) -> anyhow::Result<ReshapeOutcome> {
    let (rows, dropped) = load_chart_rows(input)?;
    let weekly = group_weekly(&rows);
    write_weekly_streams(output, &weekly)?;

    Ok(ReshapeOutcome {
        rows_read: rows.len() + dropped,
        rows_dropped: dropped,
        rows_written: weekly.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample_summary(artist: &str) -> AnalysisSummary {
        AnalysisSummary {
            artist_name: artist.to_string(),
            total_concerts: 2,
            first_concert: date("2010-01-05"),
            last_concert: date("2011-01-05"),
            countries_visited: 1,
            cities_visited: 2,
            venues_played: 2,
            years_active: 1.0,
        }
    }

    fn sample_records() -> Vec<ConcertRecord> {
        vec![
            ConcertRecord {
                date: date("2010-01-05"),
                venue: "Venue A".to_string(),
                city: "Lisbon".to_string(),
                country: "Portugal".to_string(),
            },
            ConcertRecord {
                date: date("2011-01-05"),
                venue: "Venue B".to_string(),
                city: "Porto".to_string(),
                country: "Portugal".to_string(),
            },
        ]
    }

    #[test]
    fn append_writes_header_once_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.csv");

        let written_a =
            append_analysis(&path, &sample_summary("Artist A"), &sample_records()).unwrap();
        let written_b =
            append_analysis(&path, &sample_summary("Artist B"), &sample_records()).unwrap();
        assert_eq!(written_a, 2);
        assert_eq!(written_b, 2);

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], ANALYSIS_COLUMNS.join(","));
        assert_eq!(
            contents.matches("artist_name,date,venue").count(),
            1,
            "header must appear exactly once"
        );
    }

    #[test]
    fn append_broadcasts_summary_fields_onto_every_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.csv");
        append_analysis(&path, &sample_summary("Artist A"), &sample_records()).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        for result in reader.records() {
            let row = result.unwrap();
            assert_eq!(row.len(), ANALYSIS_COLUMNS.len());
            assert_eq!(&row[0], "Artist A");
            assert_eq!(&row[5], "2");
            assert_eq!(&row[6], "2010-01-05");
            assert_eq!(&row[7], "2011-01-05");
            assert_eq!(&row[11], "1");
        }
    }

    #[test]
    fn monday_anchoring() {
        // 2024-01-01 is a Monday.
        assert_eq!(monday_week_start(date("2024-01-01")), date("2024-01-01"));
        assert_eq!(monday_week_start(date("2024-01-03")), date("2024-01-01"));
        assert_eq!(monday_week_start(date("2024-01-07")), date("2024-01-01"));
        assert_eq!(monday_week_start(date("2024-01-08")), date("2024-01-08"));
    }

    #[test]
    fn weekly_grouping_sums_streams_per_artist_week() {
        let rows = vec![
            ChartRow {
                artist_name: "A".to_string(),
                date: date("2024-01-01"),
                streams: 100,
            },
            ChartRow {
                artist_name: "A".to_string(),
                date: date("2024-01-03"),
                streams: 50,
            },
            ChartRow {
                artist_name: "B".to_string(),
                date: date("2024-01-02"),
                streams: 30,
            },
        ];

        let weekly = group_weekly(&rows);
        assert_eq!(
            weekly,
            vec![
                WeeklyStreamRow {
                    artist_name: "A".to_string(),
                    week: date("2024-01-01"),
                    streams: 150,
                },
                WeeklyStreamRow {
                    artist_name: "B".to_string(),
                    week: date("2024-01-01"),
                    streams: 30,
                },
            ]
        );
    }

    #[test]
    fn reshape_drops_bad_dates_and_overwrites_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("charts.csv");
        let output = dir.path().join("weekly.csv");
        std::fs::write(
            &input,
            "artists,date,streams\nA,2024-01-01,100\nA,not-a-date,999\nB,2024-01-02,30\n",
        )
        .unwrap();
        std::fs::write(&output, "stale contents that must be replaced\n").unwrap();

        let outcome = reshape_charts(&input, &output).unwrap();
        assert_eq!(outcome.rows_read, 3);
        assert_eq!(outcome.rows_dropped, 1);
        assert_eq!(outcome.rows_written, 2);

        let contents = std::fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "artist_name,week,streams");
        assert_eq!(lines[1], "A,2024-01-01,100");
        assert_eq!(lines[2], "B,2024-01-01,30");
        assert_eq!(lines.len(), 3);
    }
}
