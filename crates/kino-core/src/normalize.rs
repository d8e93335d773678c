//! Column normalization: the single boundary where untyped source rows
//! become [`CanonicalScreening`] records.

use tracing::{debug, warn};

use kino_model::{
    CanonicalScreening, OptionalColumns, REQUIRED_COLUMNS, SourceId, SourceTable, parse_date,
};

use crate::error::NormalizeError;

/// Legacy column names and their canonical replacements.
const COLUMN_RENAMES: [(&str, &str); 1] = [("day", "day_name")];

/// A source's records in canonical form.
#[derive(Debug, Clone)]
pub struct NormalizedTable {
    pub source: SourceId,
    pub records: Vec<CanonicalScreening>,
    pub columns: OptionalColumns,
    /// Rows dropped because their date did not parse.
    pub invalid_dates: usize,
}

impl NormalizedTable {
    pub fn empty(source: SourceId) -> Self {
        Self {
            source,
            records: Vec::new(),
            columns: OptionalColumns::default(),
            invalid_dates: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

struct ColumnMap {
    date: usize,
    city: usize,
    movie_title: usize,
    cinema_name: usize,
    time: usize,
    format: Option<usize>,
    language: Option<usize>,
    day_name: Option<usize>,
    event_type: Option<usize>,
    scraped_at: Option<usize>,
}

fn canonical_header(header: &str) -> String {
    let lower = header.trim().to_lowercase();
    COLUMN_RENAMES
        .iter()
        .find(|(legacy, _)| *legacy == lower)
        .map(|(_, canonical)| (*canonical).to_string())
        .unwrap_or(lower)
}

fn build_column_map(table: &SourceTable) -> Result<ColumnMap, NormalizeError> {
    let headers: Vec<String> = table.headers.iter().map(|h| canonical_header(h)).collect();
    let find = |name: &str| headers.iter().position(|header| header == name);
    let mut required = [0usize; REQUIRED_COLUMNS.len()];
    for (slot, column) in required.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = find(column).ok_or_else(|| NormalizeError::MissingRequiredColumn {
            source_name: table.source.name().to_string(),
            column,
        })?;
    }
    let [date, city, movie_title, cinema_name, time] = required;
    Ok(ColumnMap {
        date,
        city,
        movie_title,
        cinema_name,
        time,
        format: find("format"),
        language: find("language"),
        day_name: find("day_name"),
        event_type: find("event_type"),
        scraped_at: find("scraped_at"),
    })
}

/// Map a source table onto the canonical schema.
///
/// Rejects the whole table when a required column is missing. Absent
/// `format`, `language` and `day_name` default to empty; absent `event_type`
/// defaults to the source's event type. Rows with an unparseable date are
/// dropped and counted.
pub fn normalize_table(table: &SourceTable) -> Result<NormalizedTable, NormalizeError> {
    let source = table.source.clone();
    if table.is_empty() {
        return Ok(NormalizedTable::empty(source));
    }
    let map = build_column_map(table)?;
    let optional = |row: usize, column: Option<usize>| -> Option<String> {
        column.map(|index| table.cell(row, index).trim().to_string())
    };

    let mut records = Vec::with_capacity(table.len());
    let mut invalid_dates = 0usize;
    for row in 0..table.len() {
        let raw_date = table.cell(row, map.date);
        let Ok(date) = parse_date(raw_date) else {
            invalid_dates += 1;
            debug!(source = %source, row, value = raw_date, "dropping row with invalid date");
            continue;
        };
        let text = |index: usize| table.cell(row, index).trim().to_string();
        records.push(CanonicalScreening {
            date,
            city: text(map.city),
            movie_title: text(map.movie_title),
            cinema_name: text(map.cinema_name),
            time: text(map.time),
            format: optional(row, map.format).unwrap_or_default(),
            language: optional(row, map.language).unwrap_or_default(),
            event_type: optional(row, map.event_type)
                .unwrap_or_else(|| source.default_event_type().to_string()),
            day_name: optional(row, map.day_name).unwrap_or_default(),
            scraped_at: optional(row, map.scraped_at),
        });
    }
    if invalid_dates > 0 {
        warn!(source = %source, invalid_dates, "dropped rows with unparseable dates");
    }

    Ok(NormalizedTable {
        source,
        records,
        columns: OptionalColumns::normalized(map.scraped_at.is_some()),
        invalid_dates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_day_column_is_renamed() {
        assert_eq!(canonical_header(" Day "), "day_name");
        assert_eq!(canonical_header("Movie_Title"), "movie_title");
    }
}
