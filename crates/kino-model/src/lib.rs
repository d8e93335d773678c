//! Shared types for the screening reconciliation workspace.

pub mod chain;
pub mod columns;
pub mod error;
pub mod screening;
pub mod source;
pub mod table;

pub use chain::ChainPartition;
pub use columns::{OptionalColumns, REQUIRED_COLUMNS, SNAPSHOT_COLUMN_ORDER, WORKSHEET_HEADER};
pub use error::{ModelError, Result};
pub use screening::{CanonicalScreening, DATE_FORMAT, DedupKey, parse_date};
pub use source::{Priority, SourceId};
pub use table::SourceTable;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_sources_rank_existing_first() {
        let mut sources = [
            SourceId::cinema_city(),
            SourceId::existing(),
            SourceId::helios(),
        ];
        sources.sort_by(|a, b| b.priority().cmp(&a.priority()));
        let names: Vec<&str> = sources.iter().map(SourceId::name).collect();
        assert_eq!(names, vec!["existing", "helios", "cinema-city"]);
    }

    #[test]
    fn worksheet_header_has_seven_columns() {
        assert_eq!(WORKSHEET_HEADER.len(), 7);
        assert_eq!(WORKSHEET_HEADER[0], "Date");
    }
}
