use std::path::Path;

use csv::ReaderBuilder;

use kino_model::{SourceId, SourceTable};

use crate::error::{IngestError, Result};

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Read a source export with a header row into an untyped table.
///
/// Blank lines are skipped and short rows are padded with empty cells. An
/// empty file yields a table with no headers and no rows.
pub fn read_csv_table(path: &Path, source: SourceId) -> Result<SourceTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|error| IngestError::Csv {
            operation: "open",
            path: path.to_path_buf(),
            source: error,
        })?;
    let mut records = reader.records();
    let mut table = SourceTable::empty(source);
    let headers = loop {
        match records.next() {
            Some(record) => {
                let record = record.map_err(|error| IngestError::Csv {
                    operation: "read header of",
                    path: path.to_path_buf(),
                    source: error,
                })?;
                if record.iter().all(|value| value.trim().is_empty()) {
                    continue;
                }
                break record.iter().map(normalize_header).collect::<Vec<_>>();
            }
            None => return Ok(table),
        }
    };
    for record in records {
        let record = record.map_err(|error| IngestError::Csv {
            operation: "read record of",
            path: path.to_path_buf(),
            source: error,
        })?;
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        let mut row = Vec::with_capacity(headers.len());
        for idx in 0..headers.len() {
            row.push(record.get(idx).map(normalize_cell).unwrap_or_default());
        }
        table.push_row(row);
    }
    table.headers = headers;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_whitespace_is_collapsed() {
        assert_eq!(normalize_header("\u{feff} movie   title "), "movie title");
        assert_eq!(normalize_header("date"), "date");
    }
}
