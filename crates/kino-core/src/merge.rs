//! Priority merge of normalized sources for one date.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::info;

use kino_model::{CanonicalScreening, OptionalColumns, SourceId};

use crate::error::MergeError;
use crate::normalize::NormalizedTable;

/// Rows one source supplied for the merged date, before dedup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceContribution {
    pub source: SourceId,
    pub rows: usize,
}

/// Canonical dataset for one date.
#[derive(Debug, Clone)]
pub struct MergedSet {
    pub date: NaiveDate,
    pub records: Vec<CanonicalScreening>,
    /// Union of the optional columns of every contributing source.
    pub columns: OptionalColumns,
    /// Contributions in merge (descending priority) order.
    pub contributions: Vec<SourceContribution>,
    pub duplicates_removed: usize,
}

impl MergedSet {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Human-readable contribution line, e.g. `"12 existing + 3 helios"`.
    pub fn contribution_summary(&self) -> String {
        self.contributions
            .iter()
            .map(|c| format!("{} {}", c.rows, c.source))
            .collect::<Vec<_>>()
            .join(" + ")
    }
}

/// Merge normalized sources into the canonical dataset for `date`.
///
/// Every input is filtered to `date`, then inputs are concatenated in
/// descending priority (stable among equal priorities) and deduplicated on
/// the dedup key. The first record seen for a key wins, so a higher-priority
/// source suppresses later records even when their other attributes differ.
pub fn merge_sources<'a>(
    date: NaiveDate,
    inputs: impl IntoIterator<Item = &'a NormalizedTable>,
) -> Result<MergedSet, MergeError> {
    let mut ordered: Vec<&NormalizedTable> = inputs.into_iter().collect();
    ordered.sort_by(|a, b| b.source.priority().cmp(&a.source.priority()));

    let mut contributions = Vec::new();
    let mut columns = OptionalColumns::default();
    let mut concatenated: Vec<&CanonicalScreening> = Vec::new();
    for input in ordered {
        let before = concatenated.len();
        concatenated.extend(input.records.iter().filter(|record| record.date == date));
        let rows = concatenated.len() - before;
        if rows == 0 {
            continue;
        }
        columns = columns.union(input.columns);
        contributions.push(SourceContribution {
            source: input.source.clone(),
            rows,
        });
    }

    if concatenated.is_empty() {
        return Err(MergeError::NoDataForDate { date });
    }

    let before = concatenated.len();
    let mut seen = HashSet::with_capacity(before);
    let records: Vec<CanonicalScreening> = concatenated
        .into_iter()
        .filter(|record| seen.insert(record.dedup_key()))
        .cloned()
        .collect();
    let duplicates_removed = before - records.len();

    let merged = MergedSet {
        date,
        records,
        columns,
        contributions,
        duplicates_removed,
    };
    info!(
        date = %date,
        sources = %merged.contribution_summary(),
        records = merged.len(),
        duplicates = duplicates_removed,
        "merged sources"
    );
    Ok(merged)
}
