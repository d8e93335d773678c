use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Calendar date format shared by sources, snapshots and the worksheet.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` screening date, tolerating surrounding whitespace.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| ModelError::InvalidDate(value.to_string()))
}

/// A screening entry in the fixed, validated schema used after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalScreening {
    pub date: NaiveDate,
    pub city: String,
    pub movie_title: String,
    pub cinema_name: String,
    pub time: String,
    pub format: String,
    pub language: String,
    pub event_type: String,
    pub day_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scraped_at: Option<String>,
}

/// Composite key that must be unique within one canonical dataset.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DedupKey {
    pub date: NaiveDate,
    pub city: String,
    pub movie_title: String,
    pub cinema_name: String,
    pub time: String,
}

impl CanonicalScreening {
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            date: self.date,
            city: self.city.clone(),
            movie_title: self.movie_title.clone(),
            cinema_name: self.cinema_name.clone(),
            time: self.time.clone(),
        }
    }

    /// Ordering used inside a chain partition.
    pub fn presentation_key(&self) -> (&str, &str, &str, &str) {
        (
            self.city.as_str(),
            self.cinema_name.as_str(),
            self.movie_title.as_str(),
            self.time.as_str(),
        )
    }

    pub fn date_string(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    /// Render the seven worksheet cells in header order.
    pub fn worksheet_row(&self) -> Vec<String> {
        vec![
            self.date_string(),
            self.city.clone(),
            self.movie_title.clone(),
            self.cinema_name.clone(),
            self.time.clone(),
            self.format.clone(),
            self.language.clone(),
        ]
    }
}
