//! Tests for source normalization.

use kino_core::{NormalizeError, normalize_table};
use kino_model::{SourceId, SourceTable};

fn table(source: SourceId, headers: &[&str], rows: &[&[&str]]) -> SourceTable {
    let mut table = SourceTable::new(source, headers.iter().map(|h| h.to_string()).collect());
    for row in rows {
        table.push_row(row.iter().map(|cell| cell.to_string()).collect());
    }
    table
}

#[test]
fn defaults_fill_absent_optional_columns() {
    let source = table(
        SourceId::helios(),
        &["date", "city", "movie_title", "cinema_name", "time"],
        &[&["2026-01-10", "Łódź", "Flow", "Helios Sukcesja", "11:00"]],
    );

    let normalized = normalize_table(&source).expect("normalize");

    assert_eq!(normalized.len(), 1);
    let record = &normalized.records[0];
    assert_eq!(record.event_type, "helios-event");
    assert_eq!(record.format, "");
    assert_eq!(record.language, "");
    assert_eq!(record.day_name, "");
    assert_eq!(record.scraped_at, None);
    assert!(normalized.columns.day_name);
    assert!(normalized.columns.event_type);
    assert!(!normalized.columns.scraped_at);
}

#[test]
fn legacy_day_column_and_explicit_event_type_are_kept() {
    let source = table(
        SourceId::cinema_city(),
        &[
            "Date", "Day", "City", "Movie_Title", "Cinema_Name", "Time", "Event_Type",
            "scraped_at",
        ],
        &[&[
            "2026-01-10",
            "sobota",
            "Kraków",
            "Flow",
            "Cinema City Bonarka",
            "16:40",
            "premiere",
            "2026-01-09T07:00:00",
        ]],
    );

    let normalized = normalize_table(&source).expect("normalize");

    let record = &normalized.records[0];
    assert_eq!(record.day_name, "sobota");
    assert_eq!(record.event_type, "premiere");
    assert_eq!(record.scraped_at.as_deref(), Some("2026-01-09T07:00:00"));
    assert!(normalized.columns.scraped_at);
}

#[test]
fn missing_required_column_rejects_source() {
    let source = table(
        SourceId::cinema_city(),
        &["date", "city", "movie_title", "time"],
        &[&["2026-01-10", "Kraków", "Flow", "16:40"]],
    );

    let error = normalize_table(&source).unwrap_err();

    let NormalizeError::MissingRequiredColumn {
        source_name,
        column,
    } = error;
    assert_eq!(source_name, "cinema-city");
    assert_eq!(column, "cinema_name");
}

#[test]
fn empty_table_normalizes_to_nothing() {
    let source = SourceTable::empty(SourceId::helios());
    let normalized = normalize_table(&source).expect("normalize");
    assert!(normalized.is_empty());
    assert_eq!(normalized.invalid_dates, 0);
}

#[test]
fn unparseable_dates_are_dropped_and_counted() {
    let source = table(
        SourceId::existing(),
        &["date", "city", "movie_title", "cinema_name", "time"],
        &[
            &["2026-01-10", "Gdańsk", "Flow", "Kino Żak", "18:00"],
            &["10.01.2026", "Gdańsk", "Flow", "Kino Żak", "20:00"],
            &["", "Gdańsk", "Flow", "Kino Żak", "21:00"],
        ],
    );

    let normalized = normalize_table(&source).expect("normalize");

    assert_eq!(normalized.len(), 1);
    assert_eq!(normalized.invalid_dates, 2);
    assert_eq!(normalized.records[0].event_type, "regular");
}

#[test]
fn cells_are_trimmed() {
    let source = table(
        SourceId::existing(),
        &["date", "city", "movie_title", "cinema_name", "time"],
        &[&[" 2026-01-10 ", " Gdańsk", "Flow ", " Kino Żak ", "18:00 "]],
    );

    let record = normalize_table(&source).expect("normalize").records.remove(0);

    assert_eq!(record.city, "Gdańsk");
    assert_eq!(record.movie_title, "Flow");
    assert_eq!(record.cinema_name, "Kino Żak");
    assert_eq!(record.time, "18:00");
}
