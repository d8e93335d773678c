use chrono::NaiveDate;

use kino_ingest::SnapshotWrite;
use kino_sync::DateSyncReport;

#[derive(Debug, Default)]
pub struct RunResult {
    pub dates: Vec<DateSummary>,
    /// Run-level problems (unreadable sources, aborted sync).
    pub errors: Vec<String>,
    /// Set when a fatal destination error stopped the run.
    pub aborted: bool,
}

impl RunResult {
    pub fn has_errors(&self) -> bool {
        self.aborted || self.dates.iter().any(DateSummary::is_failure)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateStatus {
    /// Snapshot written (and synced when a destination is configured).
    Done,
    /// No source had rows for the date.
    NoData,
    Failed(String),
}

#[derive(Debug)]
pub struct DateSummary {
    pub date: NaiveDate,
    pub status: DateStatus,
    /// Contribution line, e.g. `"12 existing + 3 helios"`.
    pub sources: String,
    pub records: usize,
    pub duplicates_removed: usize,
    pub snapshot: Option<SnapshotWrite>,
    pub sync: Option<DateSyncReport>,
}

impl DateSummary {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            status: DateStatus::Done,
            sources: String::new(),
            records: 0,
            duplicates_removed: 0,
            snapshot: None,
            sync: None,
        }
    }

    pub fn failed(date: NaiveDate, error: impl Into<String>) -> Self {
        Self {
            status: DateStatus::Failed(error.into()),
            ..Self::new(date)
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.status, DateStatus::Failed(_))
            || self.sync.as_ref().is_some_and(DateSyncReport::has_failures)
    }
}
