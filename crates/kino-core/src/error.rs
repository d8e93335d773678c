use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The source's table lacks one of the dedup-key columns.
    #[error("source '{source_name}' is missing required column '{column}'")]
    MissingRequiredColumn {
        source_name: String,
        column: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum MergeError {
    /// No source supplied a record for the date.
    #[error("no screenings for {date}")]
    NoDataForDate { date: NaiveDate },
}
