pub mod csv_table;
pub mod discovery;
pub mod error;
pub mod snapshot;
pub mod source;

pub use csv_table::read_csv_table;
pub use discovery::{
    find_existing_snapshot, first_existing, latest_matching, list_csv_files, matching_files,
    resolve_source_path, snapshot_file_name, wildcard_match,
};
pub use error::{IngestError, Result};
pub use snapshot::{SnapshotWrite, content_digest, read_snapshot, snapshot_rows, write_snapshot};
pub use source::{CsvExportSource, ScreeningSource, SourceFetch, collect_sources};
