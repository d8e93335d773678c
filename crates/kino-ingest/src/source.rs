//! Screening source abstraction.
//!
//! Scrapers and API clients live outside this workspace; they hand over
//! their results as CSV exports. [`ScreeningSource`] is the seam a fetching
//! implementation plugs into, and [`collect_sources`] keeps one source's
//! failure from blocking the others.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use kino_model::{SourceId, SourceTable};

use crate::csv_table::read_csv_table;
use crate::error::{IngestError, Result};

/// Capability set of one screening source.
pub trait ScreeningSource {
    /// Identity and merge priority of the records this source yields.
    fn id(&self) -> &SourceId;

    /// Fetch raw records for a city and a `YYYY-MM-DD` date; `None` means
    /// every city or every date.
    ///
    /// The date is advisory: implementations may return other dates and the
    /// merger filters them out.
    fn fetch(&self, city: Option<&str>, date: Option<&str>) -> Result<SourceTable>;
}

/// A source backed by a CSV export on disk.
#[derive(Debug, Clone)]
pub struct CsvExportSource {
    id: SourceId,
    path: PathBuf,
}

impl CsvExportSource {
    pub fn new(id: SourceId, path: impl Into<PathBuf>) -> Self {
        Self {
            id,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScreeningSource for CsvExportSource {
    fn id(&self) -> &SourceId {
        &self.id
    }

    fn fetch(&self, city: Option<&str>, _date: Option<&str>) -> Result<SourceTable> {
        if !self.path.is_file() {
            return Err(IngestError::Io {
                operation: "open",
                path: self.path.clone(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }
        let mut table = read_csv_table(&self.path, self.id.clone())?;
        info!(
            source = %self.id,
            path = %self.path.display(),
            rows = table.len(),
            "loaded source export"
        );
        if let Some(city) = city
            && let Some(index) = table.column_index("city")
        {
            table
                .rows
                .retain(|row| row.get(index).is_some_and(|value| value.eq_ignore_ascii_case(city)));
        }
        Ok(table)
    }
}

/// Per-source result of [`collect_sources`].
#[derive(Debug)]
pub struct SourceFetch {
    pub source: SourceId,
    pub outcome: std::result::Result<SourceTable, IngestError>,
}

/// Fetch from every source, isolating failures.
///
/// A failing source is logged and reported in its [`SourceFetch`]; the
/// remaining sources are still fetched.
pub fn collect_sources(
    sources: &[Box<dyn ScreeningSource>],
    city: Option<&str>,
    date: Option<&str>,
) -> Vec<SourceFetch> {
    sources
        .iter()
        .map(|source| {
            let outcome = source.fetch(city, date);
            if let Err(error) = &outcome {
                warn!(source = %source.id(), %error, "source fetch failed");
            }
            SourceFetch {
                source: source.id().clone(),
                outcome,
            }
        })
        .collect()
}
