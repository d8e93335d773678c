//! Column names for source tables, canonical snapshots and worksheets.

/// Columns every source must provide.
pub const REQUIRED_COLUMNS: [&str; 5] = ["date", "city", "movie_title", "cinema_name", "time"];

/// Snapshot column order. `day_name`, `event_type` and `scraped_at` are
/// written only when present in the merged schema.
pub const SNAPSHOT_COLUMN_ORDER: [&str; 10] = [
    "date",
    "day_name",
    "city",
    "movie_title",
    "cinema_name",
    "time",
    "format",
    "language",
    "event_type",
    "scraped_at",
];

/// Row 1 of every chain worksheet.
pub const WORKSHEET_HEADER: [&str; 7] = [
    "Date", "City", "Movie", "Cinema", "Time", "Format", "Language",
];

/// Optional columns present in a normalized table's schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionalColumns {
    pub day_name: bool,
    pub event_type: bool,
    pub scraped_at: bool,
}

impl OptionalColumns {
    /// Schema of a table that went through normalization, which always
    /// supplies `day_name` and `event_type`.
    pub fn normalized(scraped_at: bool) -> Self {
        Self {
            day_name: true,
            event_type: true,
            scraped_at,
        }
    }

    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            day_name: self.day_name || other.day_name,
            event_type: self.event_type || other.event_type,
            scraped_at: self.scraped_at || other.scraped_at,
        }
    }

    pub fn includes(self, column: &str) -> bool {
        match column {
            "day_name" => self.day_name,
            "event_type" => self.event_type,
            "scraped_at" => self.scraped_at,
            _ => true,
        }
    }

    /// Snapshot columns for this schema, in the fixed order.
    pub fn snapshot_columns(self) -> Vec<&'static str> {
        SNAPSHOT_COLUMN_ORDER
            .iter()
            .copied()
            .filter(|column| self.includes(column))
            .collect()
    }
}
