//! The destination abstraction the sync engine writes through.

use crate::error::Result;

/// A spreadsheet-like destination made of titled worksheets.
///
/// Row numbers are 1-based and ranges are inclusive, matching what a user
/// sees in the worksheet. Row 1 holds the header.
pub trait WorksheetStore {
    fn has_worksheet(&mut self, title: &str) -> Result<bool>;

    /// Create an empty worksheet with the given grid size.
    fn add_worksheet(&mut self, title: &str, rows: usize, cols: usize) -> Result<()>;

    /// All populated rows, header included.
    fn read_rows(&mut self, title: &str) -> Result<Vec<Vec<String>>>;

    /// Append rows after the last populated row in one batched write.
    fn append_rows(&mut self, title: &str, rows: &[Vec<String>]) -> Result<()>;

    /// Delete rows `start..=end`; later rows shift up.
    fn delete_rows(&mut self, title: &str, start: usize, end: usize) -> Result<()>;
}
