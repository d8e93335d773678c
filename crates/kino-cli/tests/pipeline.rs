//! End-to-end tests for the reconciliation pipeline.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use kino_cli::pipeline::{
    PipelinePaths, collect_dates, ingest, load_existing, publish_snapshot, reconcile_date,
    reconcile_dates, secondary_sources,
};
use kino_cli::types::DateStatus;
use kino_sync::{MemoryWorkbook, RemoteError, StoreOp, SyncOptions, SyncOutcome};
use tempfile::TempDir;

const HELIOS_CSV: &str = "\
date,city,movie_title,cinema_name,time,format,language
2026-01-10,Łódź,Flow,Helios Sukcesja,11:00,2D,dubbing
2026-01-10,Łódź,Flow,Helios Manufaktura,12:30,2D,dubbing
2026-01-11,Łódź,Flow,Helios Sukcesja,11:00,2D,dubbing
";

const CINEMA_CITY_CSV: &str = "\
date,day,city,movie_title,cinema_name,time,format,language
2026-01-10,sobota,Łódź,Flow,Helios Sukcesja,11:00,IMAX,napisy
2026-01-10,sobota,Warszawa,Anora,Cinema City Arkadia,20:15,2D,napisy
2026-01-10,sobota,Warszawa,Anora,Kino Muranów,18:00,2D,napisy
";

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, day).unwrap()
}

struct Workspace {
    _dir: TempDir,
    paths: PipelinePaths,
}

fn workspace(helios: &str, cinema_city: &str) -> Workspace {
    let dir = TempDir::new().unwrap();
    let source_dir = dir.path().join("cinema_data");
    fs::create_dir_all(&source_dir).unwrap();
    fs::write(source_dir.join("helios_events_2026-01-09_0600.csv"), helios).unwrap();
    fs::write(source_dir.join("cinema_city_2026-01-09_0600.csv"), cinema_city).unwrap();
    let paths = PipelinePaths {
        data_dir: dir.path().join("data/daily"),
        source_dir,
    };
    Workspace { _dir: dir, paths }
}

fn load(paths: &PipelinePaths) -> kino_cli::pipeline::IngestResult {
    let sources = secondary_sources(None, None, &paths.source_dir).unwrap();
    ingest(&sources)
}

#[test]
fn dates_come_from_secondary_exports() {
    let ws = workspace(HELIOS_CSV, CINEMA_CITY_CSV);
    let ingested = load(&ws.paths);
    assert!(ingested.errors.is_empty());
    assert_eq!(collect_dates(&ingested.tables), vec![date(10), date(11)]);
}

#[test]
fn rerun_is_idempotent_locally_and_remotely() {
    let ws = workspace(HELIOS_CSV, CINEMA_CITY_CSV);
    let ingested = load(&ws.paths);
    let mut book = MemoryWorkbook::new();

    let first = reconcile_date(
        date(10),
        &ingested.tables,
        &ws.paths,
        Some(&mut book),
        SyncOptions::default(),
    )
    .unwrap();

    assert_eq!(first.status, DateStatus::Done);
    // Helios Sukcesja 11:00 is shared; the Helios export outranks Cinema City.
    assert_eq!(first.records, 4);
    assert_eq!(first.duplicates_removed, 1);
    assert_eq!(book.data_rows("Helios"), 2);
    assert_eq!(book.data_rows("Cinema City"), 1);
    assert_eq!(book.data_rows("Inne"), 1);
    assert!(book.rows("Multikino").is_none());
    let sukcesja = &book.rows("Helios").unwrap()[2];
    assert_eq!(sukcesja[3], "Helios Sukcesja");
    assert_eq!(sukcesja[5], "2D");

    let ingested = load(&ws.paths);
    let second = reconcile_date(
        date(10),
        &ingested.tables,
        &ws.paths,
        Some(&mut book),
        SyncOptions::default(),
    )
    .unwrap();

    let snapshot = second.snapshot.as_ref().unwrap();
    assert!(snapshot.unchanged());
    assert_eq!(second.records, 4);
    assert_eq!(book.data_rows("Helios"), 2);
    assert_eq!(book.data_rows("Cinema City"), 1);
    assert_eq!(book.data_rows("Inne"), 1);
    let sync = second.sync.unwrap();
    assert!(sync.partitions.iter().all(|p| matches!(
        p.outcome,
        SyncOutcome::Published { .. } | SyncOutcome::NoRows
    )));
}

#[test]
fn existing_snapshot_outranks_new_exports() {
    let ws = workspace(HELIOS_CSV, CINEMA_CITY_CSV);
    fs::create_dir_all(&ws.paths.data_dir).unwrap();
    fs::write(
        ws.paths.data_dir.join("cinema_2026-01-10.csv"),
        "date,city,movie_title,cinema_name,time,format,language,event_type\n\
         2026-01-10,Łódź,Flow,Helios Sukcesja,11:00,4DX,dubbing,regular\n\
         2026-01-09,Łódź,Flow,Helios Sukcesja,11:00,4DX,dubbing,regular\n",
    )
    .unwrap();
    let ingested = load(&ws.paths);

    let summary =
        reconcile_date(date(10), &ingested.tables, &ws.paths, None, SyncOptions::default())
            .unwrap();

    assert_eq!(summary.records, 4);
    assert!(summary.sync.is_none());
    let existing = load_existing(&ws.paths, "2026-01-10").unwrap();
    let sukcesja = existing
        .records
        .iter()
        .find(|r| r.cinema_name == "Helios Sukcesja" && r.time == "11:00")
        .unwrap();
    assert_eq!(sukcesja.format, "4DX");
    assert_eq!(sukcesja.event_type, "regular");
    assert!(existing.records.iter().all(|r| r.date == date(10)));
}

#[test]
fn date_without_rows_is_skipped_without_writing() {
    let ws = workspace(HELIOS_CSV, CINEMA_CITY_CSV);
    let ingested = load(&ws.paths);

    let summary =
        reconcile_date(date(20), &ingested.tables, &ws.paths, None, SyncOptions::default())
            .unwrap();

    assert_eq!(summary.status, DateStatus::NoData);
    assert!(!ws.paths.data_dir.join("cinema_2026-01-20.csv").exists());
}

#[test]
fn broken_source_does_not_block_the_others() {
    let ws = workspace(HELIOS_CSV, "date,city,movie_title,time\n2026-01-10,Łódź,Flow,11:00\n");
    let ingested = load(&ws.paths);

    assert_eq!(ingested.tables.len(), 1);
    assert_eq!(ingested.errors.len(), 1);
    assert!(ingested.errors[0].contains("cinema_name"));
}

#[test]
fn fatal_destination_error_is_returned() {
    let ws = workspace(HELIOS_CSV, CINEMA_CITY_CSV);
    let ingested = load(&ws.paths);
    let mut book = MemoryWorkbook::new();
    book.revoke_credentials();

    let err = reconcile_date(
        date(10),
        &ingested.tables,
        &ws.paths,
        Some(&mut book),
        SyncOptions::default(),
    )
    .unwrap_err();

    let remote = err.downcast_ref::<RemoteError>().unwrap();
    assert!(remote.is_fatal());
}

#[test]
fn failed_date_does_not_stop_later_dates() {
    let ws = workspace(HELIOS_CSV, CINEMA_CITY_CSV);
    fs::create_dir_all(&ws.paths.data_dir).unwrap();
    fs::write(
        ws.paths.data_dir.join("cinema_2026-01-10.csv"),
        b"date,city,movie_title,cinema_name,time\n2026-01-10,\xff\xfe,Flow,Kino,10:00\n",
    )
    .unwrap();
    let ingested = load(&ws.paths);
    let mut book = MemoryWorkbook::new();

    let result = reconcile_dates(
        &[date(10), date(11)],
        &ingested.tables,
        &ws.paths,
        Some(&mut book),
        SyncOptions::default(),
    );

    assert!(!result.aborted);
    assert!(result.has_errors());
    assert_eq!(result.dates.len(), 2);
    assert!(matches!(result.dates[0].status, DateStatus::Failed(_)));
    assert_eq!(result.dates[1].status, DateStatus::Done);
    assert!(result.dates[1].sync.is_some());
    // Only the 2026-01-11 Helios screening reached the workbook.
    assert_eq!(book.data_rows("Helios"), 1);
    assert_eq!(book.rows("Helios").unwrap()[1][0], "2026-01-11");
    assert!(book.rows("Cinema City").is_none());
}

#[test]
fn fatal_destination_error_aborts_remaining_dates() {
    let ws = workspace(HELIOS_CSV, CINEMA_CITY_CSV);
    let ingested = load(&ws.paths);
    let mut book = MemoryWorkbook::new();
    book.revoke_credentials();

    let result = reconcile_dates(
        &[date(10), date(11)],
        &ingested.tables,
        &ws.paths,
        Some(&mut book),
        SyncOptions::default(),
    );

    assert!(result.aborted);
    assert!(result.has_errors());
    assert!(result.dates.is_empty());
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("credentials"));
    assert!(!ws.paths.data_dir.join("cinema_2026-01-11.csv").exists());
    assert_eq!(book.titles().count(), 0);
}

#[test]
fn publish_drops_rows_for_other_dates() {
    let dir = TempDir::new().unwrap();
    let csv = dir.path().join("cinema_2026-01-10.csv");
    fs::write(
        &csv,
        "date,city,movie_title,cinema_name,time,format,language\n\
         2026-01-10,Kraków,Flow,Multikino Kraków,18:00,2D,napisy\n\
         2026-01-11,Kraków,Flow,Multikino Kraków,18:00,2D,napisy\n",
    )
    .unwrap();
    let mut book = MemoryWorkbook::new();

    let summary = publish_snapshot(
        Path::new(&csv),
        date(10),
        &mut book,
        SyncOptions::default().with_replace(false),
    )
    .unwrap();

    assert_eq!(summary.records, 1);
    assert_eq!(book.data_rows("Multikino"), 1);
    assert!(book.ops().contains(&StoreOp::AddWorksheet {
        title: "Multikino".to_string()
    }));

    let again = publish_snapshot(
        Path::new(&csv),
        date(10),
        &mut book,
        SyncOptions::default().with_replace(false),
    )
    .unwrap();
    let multikino = again
        .sync
        .unwrap()
        .partitions
        .into_iter()
        .find(|p| p.records > 0)
        .unwrap();
    assert_eq!(multikino.outcome, SyncOutcome::Skipped { existing: 1 });
    assert_eq!(book.data_rows("Multikino"), 1);
}
