//! Canonical snapshot persistence.
//!
//! One CSV per date holds the reconciled screenings. Every write replaces
//! the whole file (temp file + rename) and the next run reads it back as the
//! highest-priority source.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::info;

use kino_model::{CanonicalScreening, OptionalColumns, SourceId, SourceTable};

use crate::csv_table::read_csv_table;
use crate::discovery::snapshot_file_name;
use crate::error::{IngestError, Result};

/// Column excluded from the content digest; it changes on every scrape.
const VOLATILE_COLUMN: &str = "scraped_at";

/// Outcome of writing one canonical snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotWrite {
    pub path: PathBuf,
    pub rows: usize,
    /// SHA-256 over every column except `scraped_at`.
    pub digest: String,
    /// Digest of the file this write replaced, if there was one.
    pub previous_digest: Option<String>,
}

impl SnapshotWrite {
    /// True when the replaced snapshot had identical content.
    pub fn unchanged(&self) -> bool {
        self.previous_digest.as_deref() == Some(self.digest.as_str())
    }
}

fn cell_for(record: &CanonicalScreening, column: &str) -> String {
    match column {
        "date" => record.date_string(),
        "day_name" => record.day_name.clone(),
        "city" => record.city.clone(),
        "movie_title" => record.movie_title.clone(),
        "cinema_name" => record.cinema_name.clone(),
        "time" => record.time.clone(),
        "format" => record.format.clone(),
        "language" => record.language.clone(),
        "event_type" => record.event_type.clone(),
        "scraped_at" => record.scraped_at.clone().unwrap_or_default(),
        _ => String::new(),
    }
}

/// Render records into snapshot rows for the given schema.
pub fn snapshot_rows(
    records: &[CanonicalScreening],
    columns: OptionalColumns,
) -> (Vec<&'static str>, Vec<Vec<String>>) {
    let headers = columns.snapshot_columns();
    let rows = records
        .iter()
        .map(|record| headers.iter().map(|column| cell_for(record, column)).collect())
        .collect();
    (headers, rows)
}

/// Digest of tabular content, ignoring the volatile scrape timestamp.
pub fn content_digest<H: AsRef<str>>(headers: &[H], rows: &[Vec<String>]) -> String {
    let keep: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, header)| !header.as_ref().eq_ignore_ascii_case(VOLATILE_COLUMN))
        .map(|(idx, _)| idx)
        .collect();
    let mut hasher = Sha256::new();
    for idx in &keep {
        hasher.update(headers[*idx].as_ref().as_bytes());
        hasher.update([0x1f]);
    }
    hasher.update([0x1e]);
    for row in rows {
        for idx in &keep {
            let value = row.get(*idx).map(String::as_str).unwrap_or("");
            hasher.update(value.as_bytes());
            hasher.update([0x1f]);
        }
        hasher.update([0x1e]);
    }
    hex::encode(hasher.finalize())
}

/// Read a canonical snapshot as the `existing` source.
pub fn read_snapshot(path: &Path) -> Result<SourceTable> {
    read_csv_table(path, SourceId::existing())
}

fn encode_csv(headers: &[&str], rows: &[Vec<String>], path: &Path) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let csv_error = |error: csv::Error| IngestError::Csv {
        operation: "encode",
        path: path.to_path_buf(),
        source: error,
    };
    writer.write_record(headers).map_err(csv_error)?;
    for row in rows {
        writer.write_record(row).map_err(csv_error)?;
    }
    writer.into_inner().map_err(|error| IngestError::Io {
        operation: "encode",
        path: path.to_path_buf(),
        source: error.into_error(),
    })
}

/// Write the canonical snapshot for `date` into `data_dir`, replacing any
/// previous file.
///
/// Uses atomic write (temp file + rename) so a crash never leaves a
/// truncated snapshot behind.
pub fn write_snapshot(
    data_dir: &Path,
    date: &str,
    records: &[CanonicalScreening],
    columns: OptionalColumns,
) -> Result<SnapshotWrite> {
    let path = data_dir.join(snapshot_file_name(date));
    let (headers, rows) = snapshot_rows(records, columns);
    let digest = content_digest(&headers, &rows);

    let previous_digest = if path.is_file() {
        let previous = read_snapshot(&path)?;
        Some(content_digest(&previous.headers, &previous.rows))
    } else {
        None
    };

    let bytes = encode_csv(&headers, &rows, &path)?;

    fs::create_dir_all(data_dir).map_err(|e| IngestError::Io {
        operation: "create directory",
        path: data_dir.to_path_buf(),
        source: e,
    })?;

    let temp_path = path.with_extension("csv.tmp");
    let mut file = File::create(&temp_path).map_err(|e| IngestError::Io {
        operation: "create",
        path: temp_path.clone(),
        source: e,
    })?;
    file.write_all(&bytes).map_err(|e| IngestError::Io {
        operation: "write",
        path: temp_path.clone(),
        source: e,
    })?;
    file.sync_all().map_err(|e| IngestError::Io {
        operation: "sync",
        path: temp_path.clone(),
        source: e,
    })?;
    drop(file);

    fs::rename(&temp_path, &path).map_err(|e| IngestError::AtomicWriteFailed {
        temp_path: temp_path.clone(),
        target_path: path.clone(),
        source: e,
    })?;

    info!(path = %path.display(), rows = rows.len(), "saved canonical snapshot");
    Ok(SnapshotWrite {
        path,
        rows: rows.len(),
        digest,
        previous_digest,
    })
}
