use crate::SourceId;

/// Untyped rows delivered by one source, before normalization.
#[derive(Debug, Clone)]
pub struct SourceTable {
    pub source: SourceId,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SourceTable {
    pub fn new(source: SourceId, headers: Vec<String>) -> Self {
        Self {
            source,
            headers,
            rows: Vec::new(),
        }
    }

    pub fn empty(source: SourceId) -> Self {
        Self::new(source, Vec::new())
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Position of a header, compared case-insensitively.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|header| header.trim().eq_ignore_ascii_case(name))
    }

    /// Cell text by row and column index; short rows read as empty.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|values| values.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }
}
