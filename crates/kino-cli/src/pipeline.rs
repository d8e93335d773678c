//! Reconciliation pipeline with explicit stages.
//!
//! The pipeline follows these stages in order:
//! 1. **Ingest**: resolve and read the secondary exports, normalize them once
//! 2. **Merge**: per date, read the existing snapshot and merge by priority
//! 3. **Persist**: overwrite the canonical snapshot for the date
//! 4. **Classify**: partition the merged records by cinema chain
//! 5. **Sync**: publish each partition to the worksheet store
//!
//! Stages 2-5 run once per date. A failure inside one date is recorded in its
//! [`DateSummary`]; only a fatal destination error is returned as `Err`.

use std::collections::BTreeSet;
use std::iter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{error, info, info_span, warn};

use kino_core::{NormalizedTable, merge_sources, normalize_table, partition_by_chain};
use kino_ingest::{
    CsvExportSource, ScreeningSource, collect_sources, find_existing_snapshot, read_snapshot,
    resolve_source_path, snapshot_file_name, write_snapshot,
};
use kino_model::{DATE_FORMAT, SourceId};
use kino_sync::{RemoteError, SyncOptions, WorksheetStore, sync_date};

use crate::types::{DateStatus, DateSummary, RunResult};

/// File name prefix of Helios event exports.
pub const HELIOS_EXPORT_PREFIX: &str = "helios_events_";
/// File name prefix of Cinema City exports.
pub const CINEMA_CITY_EXPORT_PREFIX: &str = "cinema_city_";

/// Where snapshots are written and exports are looked up.
#[derive(Debug, Clone)]
pub struct PipelinePaths {
    pub data_dir: PathBuf,
    pub source_dir: PathBuf,
}

// ============================================================================
// Stage 1: Ingest
// ============================================================================

/// Result of the ingest stage.
#[derive(Debug)]
pub struct IngestResult {
    /// Normalized secondary sources, all dates.
    pub tables: Vec<NormalizedTable>,
    /// Sources that could not be read or normalized.
    pub errors: Vec<String>,
}

/// Build the secondary sources from explicit paths or the newest exports in
/// `source_dir`. Sources without an export are skipped with a warning.
pub fn secondary_sources(
    helios_csv: Option<&Path>,
    cinema_city_csv: Option<&Path>,
    source_dir: &Path,
) -> Result<Vec<Box<dyn ScreeningSource>>> {
    let candidates = [
        (SourceId::helios(), helios_csv, HELIOS_EXPORT_PREFIX),
        (SourceId::cinema_city(), cinema_city_csv, CINEMA_CITY_EXPORT_PREFIX),
    ];
    let mut sources: Vec<Box<dyn ScreeningSource>> = Vec::new();
    for (id, explicit, prefix) in candidates {
        let resolved = resolve_source_path(explicit, source_dir, prefix)
            .with_context(|| format!("resolve {id} export"))?;
        match resolved {
            Some(path) => {
                info!(source = %id, path = %path.display(), "using export");
                sources.push(Box::new(CsvExportSource::new(id, path)));
            }
            None => warn!(source = %id, "no export found, source skipped"),
        }
    }
    Ok(sources)
}

/// Fetch and normalize every source. Failures are isolated per source.
pub fn ingest(sources: &[Box<dyn ScreeningSource>]) -> IngestResult {
    let mut tables = Vec::new();
    let mut errors = Vec::new();
    for fetch in collect_sources(sources, None, None) {
        let table = match fetch.outcome {
            Ok(table) => table,
            Err(error) => {
                errors.push(format!("{}: {error}", fetch.source));
                continue;
            }
        };
        match normalize_table(&table) {
            Ok(normalized) => {
                info!(
                    source = %normalized.source,
                    records = normalized.len(),
                    invalid_dates = normalized.invalid_dates,
                    "loaded source"
                );
                tables.push(normalized);
            }
            Err(error) => {
                warn!(%error, "source rejected");
                errors.push(error.to_string());
            }
        }
    }
    IngestResult { tables, errors }
}

/// Distinct dates present in the tables, ascending.
pub fn collect_dates(tables: &[NormalizedTable]) -> Vec<NaiveDate> {
    tables
        .iter()
        .flat_map(|table| table.records.iter().map(|record| record.date))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// ============================================================================
// Stage 2-5: per date
// ============================================================================

/// Read the existing snapshot for a date as the highest-priority source.
///
/// A missing snapshot is an empty source. A snapshot lacking required
/// columns is dropped with a warning like any other source.
pub fn load_existing(paths: &PipelinePaths, date: &str) -> Result<NormalizedTable> {
    let Some(path) = find_existing_snapshot(&paths.data_dir, &paths.source_dir, date)
        .context("locate existing snapshot")?
    else {
        info!("no existing snapshot");
        return Ok(NormalizedTable::empty(SourceId::existing()));
    };
    let table = read_snapshot(&path)
        .with_context(|| format!("read existing snapshot {}", path.display()))?;
    match normalize_table(&table) {
        Ok(normalized) => {
            info!(path = %path.display(), records = normalized.len(), "loaded existing snapshot");
            Ok(normalized)
        }
        Err(error) => {
            warn!(path = %path.display(), %error, "existing snapshot ignored");
            Ok(NormalizedTable::empty(SourceId::existing()))
        }
    }
}

/// Run stages 2-5 for one date.
///
/// `store` is `None` when publishing is disabled. Returns `Err` only for a
/// fatal destination error, which must abort the remaining dates.
pub fn reconcile_date(
    date: NaiveDate,
    secondary: &[NormalizedTable],
    paths: &PipelinePaths,
    store: Option<&mut dyn WorksheetStore>,
    options: SyncOptions,
) -> Result<DateSummary> {
    let date_text = date.format(DATE_FORMAT).to_string();
    let span = info_span!("date", date = %date_text);
    let _guard = span.enter();

    let existing = match load_existing(paths, &date_text) {
        Ok(existing) => existing,
        Err(error) => {
            warn!(error = %format!("{error:#}"), "date failed");
            return Ok(DateSummary::failed(date, format!("{error:#}")));
        }
    };

    let merged = match merge_sources(date, iter::once(&existing).chain(secondary)) {
        Ok(merged) => merged,
        Err(error) => {
            warn!(%error, "skipping date");
            return Ok(DateSummary {
                status: DateStatus::NoData,
                ..DateSummary::new(date)
            });
        }
    };

    let snapshot = match write_snapshot(&paths.data_dir, &date_text, &merged.records, merged.columns)
    {
        Ok(snapshot) => snapshot,
        Err(error) => {
            warn!(%error, "date failed");
            return Ok(DateSummary::failed(date, error.to_string()));
        }
    };
    if snapshot.unchanged() {
        info!(path = %snapshot.path.display(), "snapshot content unchanged");
    }

    let mut summary = DateSummary {
        sources: merged.contribution_summary(),
        records: merged.len(),
        duplicates_removed: merged.duplicates_removed,
        snapshot: Some(snapshot),
        ..DateSummary::new(date)
    };

    if let Some(store) = store {
        let groups = partition_by_chain(&merged.records);
        let report = sync_date(store, &date_text, &groups, options)
            .with_context(|| format!("publish {date_text}"))?;
        summary.sync = Some(report);
    }
    Ok(summary)
}

/// Run stages 2-5 for every date, in order.
///
/// A failed date is recorded and the next date proceeds. A fatal destination
/// error sets [`RunResult::aborted`] and leaves the remaining dates
/// unprocessed.
pub fn reconcile_dates(
    dates: &[NaiveDate],
    secondary: &[NormalizedTable],
    paths: &PipelinePaths,
    mut store: Option<&mut dyn WorksheetStore>,
    options: SyncOptions,
) -> RunResult {
    let mut result = RunResult::default();
    for &date in dates {
        let store = store.as_mut().map(|s| &mut **s as &mut dyn WorksheetStore);
        match reconcile_date(date, secondary, paths, store, options) {
            Ok(summary) => result.dates.push(summary),
            Err(err) => {
                error!(%date, error = %format!("{err:#}"), "aborting run");
                let message = match err.downcast_ref::<RemoteError>() {
                    Some(remote) => format!("{err:#}. {}", remote.user_message()),
                    None => format!("{err:#}"),
                };
                result.errors.push(message);
                result.aborted = true;
                break;
            }
        }
    }
    result
}

// ============================================================================
// Publish an existing snapshot
// ============================================================================

/// Default locations of a date's canonical CSV, in lookup order.
pub fn publish_candidates(date: &str) -> Vec<PathBuf> {
    let file_name = snapshot_file_name(date);
    vec![
        Path::new("cinema_data").join(&file_name),
        Path::new("data/daily").join(&file_name),
        PathBuf::from(file_name),
    ]
}

/// Publish one canonical CSV for `date` without merging.
///
/// Rows for other dates are dropped with a warning.
pub fn publish_snapshot(
    path: &Path,
    date: NaiveDate,
    store: &mut dyn WorksheetStore,
    options: SyncOptions,
) -> Result<DateSummary> {
    let date_text = date.format(DATE_FORMAT).to_string();
    let span = info_span!("date", date = %date_text);
    let _guard = span.enter();

    let table =
        read_snapshot(path).with_context(|| format!("read snapshot {}", path.display()))?;
    let normalized =
        normalize_table(&table).with_context(|| format!("normalize {}", path.display()))?;
    let (records, other_dates): (Vec<_>, Vec<_>) = normalized
        .records
        .into_iter()
        .partition(|record| record.date == date);
    if !other_dates.is_empty() {
        warn!(dropped = other_dates.len(), "dropping rows for other dates");
    }
    if records.is_empty() {
        warn!(path = %path.display(), "no rows for date, nothing to publish");
        return Ok(DateSummary {
            status: DateStatus::NoData,
            ..DateSummary::new(date)
        });
    }
    info!(path = %path.display(), records = records.len(), "publishing snapshot");

    let groups = partition_by_chain(&records);
    let report = sync_date(store, &date_text, &groups, options)
        .with_context(|| format!("publish {date_text}"))?;
    Ok(DateSummary {
        sources: format!("{} snapshot", records.len()),
        records: records.len(),
        sync: Some(report),
        ..DateSummary::new(date)
    })
}
