//! In-memory worksheet store with an operation log and fault injection.
//!
//! Backs the sync engine tests. Deletions shift rows
//! exactly like the real destination does.

use std::collections::BTreeMap;

use crate::error::{RemoteError, Result};
use crate::store::WorksheetStore;

/// A mutating call recorded by [`MemoryWorkbook`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    AddWorksheet { title: String },
    Append { title: String, rows: usize },
    Delete { title: String, start: usize, end: usize },
}

#[derive(Debug, Clone, Default)]
struct Faults {
    rate_limit_after_deletes: Option<usize>,
    revoked: bool,
    fail_appends: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    sheets: BTreeMap<String, Vec<Vec<String>>>,
    ops: Vec<StoreOp>,
    deletes: usize,
    faults: Faults,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a worksheet with rows (header included).
    #[must_use]
    pub fn with_worksheet(mut self, title: &str, rows: Vec<Vec<String>>) -> Self {
        self.sheets.insert(title.to_string(), rows);
        self
    }

    /// Answer every delete after the first `allowed` with a rate-limit error.
    #[must_use]
    pub fn rate_limit_after_deletes(mut self, allowed: usize) -> Self {
        self.faults.rate_limit_after_deletes = Some(allowed);
        self
    }

    /// Reject all further calls as unauthenticated.
    pub fn revoke_credentials(&mut self) {
        self.faults.revoked = true;
    }

    /// Fail appends with a server error.
    #[must_use]
    pub fn failing_appends(mut self) -> Self {
        self.faults.fail_appends = true;
        self
    }

    pub fn rows(&self, title: &str) -> Option<&[Vec<String>]> {
        self.sheets.get(title).map(Vec::as_slice)
    }

    /// Data rows of a worksheet, header excluded.
    pub fn data_rows(&self, title: &str) -> usize {
        self.rows(title).map_or(0, |rows| rows.len().saturating_sub(1))
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.sheets.keys().map(String::as_str)
    }

    pub fn ops(&self) -> &[StoreOp] {
        &self.ops
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    fn check_access(&self) -> Result<()> {
        if self.faults.revoked {
            return Err(RemoteError::Authentication(
                "credentials revoked".to_string(),
            ));
        }
        Ok(())
    }

    fn sheet_mut(&mut self, title: &str) -> Result<&mut Vec<Vec<String>>> {
        self.sheets.get_mut(title).ok_or_else(|| RemoteError::Api {
            status: 400,
            message: format!("Unable to parse range: '{title}'"),
        })
    }
}

impl WorksheetStore for MemoryWorkbook {
    fn has_worksheet(&mut self, title: &str) -> Result<bool> {
        self.check_access()?;
        Ok(self.sheets.contains_key(title))
    }

    fn add_worksheet(&mut self, title: &str, _rows: usize, _cols: usize) -> Result<()> {
        self.check_access()?;
        if self.sheets.contains_key(title) {
            return Err(RemoteError::Api {
                status: 400,
                message: format!("A sheet with the name \"{title}\" already exists"),
            });
        }
        self.sheets.insert(title.to_string(), Vec::new());
        self.ops.push(StoreOp::AddWorksheet {
            title: title.to_string(),
        });
        Ok(())
    }

    fn read_rows(&mut self, title: &str) -> Result<Vec<Vec<String>>> {
        self.check_access()?;
        Ok(self.sheet_mut(title)?.clone())
    }

    fn append_rows(&mut self, title: &str, rows: &[Vec<String>]) -> Result<()> {
        self.check_access()?;
        if self.faults.fail_appends {
            return Err(RemoteError::Api {
                status: 503,
                message: "The service is currently unavailable.".to_string(),
            });
        }
        self.sheet_mut(title)?.extend_from_slice(rows);
        self.ops.push(StoreOp::Append {
            title: title.to_string(),
            rows: rows.len(),
        });
        Ok(())
    }

    fn delete_rows(&mut self, title: &str, start: usize, end: usize) -> Result<()> {
        self.check_access()?;
        if self
            .faults
            .rate_limit_after_deletes
            .is_some_and(|allowed| self.deletes >= allowed)
        {
            return Err(RemoteError::RateLimited { retry_after: 60 });
        }
        let sheet = self.sheet_mut(title)?;
        if start == 0 || start > end || end > sheet.len() {
            return Err(RemoteError::Api {
                status: 400,
                message: format!("invalid row range {start}..={end}"),
            });
        }
        sheet.drain(start - 1..end);
        self.deletes += 1;
        self.ops.push(StoreOp::Delete {
            title: title.to_string(),
            start,
            end,
        });
        Ok(())
    }
}
