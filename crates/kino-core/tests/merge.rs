//! Tests for the priority merge.

use chrono::NaiveDate;
use kino_core::{MergeError, NormalizedTable, merge_sources};
use kino_model::{CanonicalScreening, OptionalColumns, SourceId};

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, day).unwrap()
}

fn screening(day: u32, cinema: &str, time: &str, event_type: &str) -> CanonicalScreening {
    CanonicalScreening {
        date: date(day),
        city: "Warszawa".to_string(),
        movie_title: "Flow".to_string(),
        cinema_name: cinema.to_string(),
        time: time.to_string(),
        format: "2D".to_string(),
        language: "dubbing".to_string(),
        event_type: event_type.to_string(),
        day_name: String::new(),
        scraped_at: None,
    }
}

fn input(source: SourceId, records: Vec<CanonicalScreening>) -> NormalizedTable {
    NormalizedTable {
        source,
        records,
        columns: OptionalColumns::normalized(false),
        invalid_dates: 0,
    }
}

#[test]
fn existing_snapshot_wins_duplicate_keys() {
    let existing = input(
        SourceId::existing(),
        vec![
            screening(10, "Cinema City Arkadia", "18:00", "regular"),
            screening(10, "Kino Muranów", "20:00", "regular"),
        ],
    );
    let mut conflicting = screening(10, "Cinema City Arkadia", "18:00", "cinema-city");
    conflicting.format = "IMAX".to_string();
    let cinema_city = input(
        SourceId::cinema_city(),
        vec![
            conflicting,
            screening(10, "Cinema City Arkadia", "21:15", "cinema-city"),
        ],
    );

    // Lower-priority source listed first: order of inputs must not matter.
    let merged = merge_sources(date(10), &[cinema_city, existing]).expect("merge");

    assert_eq!(merged.len(), 3);
    assert_eq!(merged.duplicates_removed, 1);
    let arkadia = &merged.records[0];
    assert_eq!(arkadia.time, "18:00");
    assert_eq!(arkadia.event_type, "regular");
    assert_eq!(arkadia.format, "2D");
    assert_eq!(merged.records[2].event_type, "cinema-city");
    assert_eq!(merged.contribution_summary(), "2 existing + 2 cinema-city");
}

#[test]
fn helios_outranks_cinema_city() {
    let helios = input(
        SourceId::helios(),
        vec![screening(10, "Helios Atrium", "12:00", "helios-event")],
    );
    let cinema_city = input(
        SourceId::cinema_city(),
        vec![screening(10, "Helios Atrium", "12:00", "cinema-city")],
    );

    let merged = merge_sources(date(10), &[cinema_city, helios]).expect("merge");

    assert_eq!(merged.len(), 1);
    assert_eq!(merged.records[0].event_type, "helios-event");
}

#[test]
fn result_keys_are_unique() {
    let existing = input(
        SourceId::existing(),
        vec![
            screening(10, "Kino Luna", "18:00", "regular"),
            screening(10, "Kino Luna", "18:00", "regular"),
        ],
    );

    let merged = merge_sources(date(10), &[existing]).expect("merge");

    assert_eq!(merged.len(), 1);
    assert_eq!(merged.duplicates_removed, 1);
}

#[test]
fn rows_for_other_dates_are_ignored() {
    let existing = input(
        SourceId::existing(),
        vec![
            screening(9, "Kino Luna", "18:00", "regular"),
            screening(10, "Kino Luna", "18:00", "regular"),
        ],
    );
    let helios = input(
        SourceId::helios(),
        vec![screening(11, "Helios Atrium", "12:00", "helios-event")],
    );

    let merged = merge_sources(date(10), &[existing, helios]).expect("merge");

    assert_eq!(merged.len(), 1);
    assert_eq!(merged.records[0].date, date(10));
    assert_eq!(merged.contributions.len(), 1);
}

#[test]
fn no_rows_for_date_is_an_error() {
    let helios = input(
        SourceId::helios(),
        vec![screening(11, "Helios Atrium", "12:00", "helios-event")],
    );

    let error = merge_sources(date(10), &[helios, NormalizedTable::empty(SourceId::existing())])
        .unwrap_err();

    assert!(matches!(error, MergeError::NoDataForDate { date: d } if d == date(10)));
}

#[test]
fn optional_columns_are_unioned() {
    let mut existing = input(
        SourceId::existing(),
        vec![screening(10, "Kino Luna", "18:00", "regular")],
    );
    existing.columns = OptionalColumns::normalized(true);
    let helios = input(
        SourceId::helios(),
        vec![screening(10, "Helios Atrium", "12:00", "helios-event")],
    );

    let merged = merge_sources(date(10), &[existing, helios]).expect("merge");

    assert_eq!(merged.columns, OptionalColumns::normalized(true));
}
