//! Idempotent publish of one date's chain partitions.
//!
//! Each (partition, date) pair walks a small state machine:
//!
//! ```text
//! ABSENT ──create+header──▶ EMPTY ──append──▶ PUBLISHED
//! PUBLISHED ──replace──▶ CLEARING ──done──▶ EMPTY
//!           └─no replace─▶ SKIPPED     └─cap/error─▶ PARTIAL
//! ```
//!
//! A worksheet that exists but holds no rows at all counts as ABSENT: it
//! gets its header before any data, so row 1 is always the header.
//!
//! The remote worksheet is rescanned on every sync, so nothing is cached
//! across runs. Fatal errors (authentication, missing spreadsheet) are
//! returned as `Err`; everything else is folded into the partition report.

use std::fmt;

use tracing::{info, info_span, warn};

use kino_core::ChainGroup;
use kino_model::{ChainPartition, WORKSHEET_HEADER};

use crate::error::Result;
use crate::plan::{DeletionStep, date_row_indices, plan_deletions};
use crate::store::WorksheetStore;

/// Deletions allowed per partition and run when rows are scattered.
pub const DEFAULT_DELETE_BATCH_LIMIT: usize = 50;
/// Grid size of a newly created worksheet.
pub const NEW_WORKSHEET_ROWS: usize = 1000;
pub const NEW_WORKSHEET_COLS: usize = WORKSHEET_HEADER.len();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Replace rows already published for the date.
    pub replace: bool,
    pub delete_batch_limit: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            replace: true,
            delete_batch_limit: DEFAULT_DELETE_BATCH_LIMIT,
        }
    }
}

impl SyncOptions {
    #[must_use]
    pub fn with_replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }

    #[must_use]
    pub fn with_delete_batch_limit(mut self, limit: usize) -> Self {
        self.delete_batch_limit = limit.max(1);
        self
    }
}

/// States a (partition, date) pair passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Absent,
    Empty,
    Published,
    Clearing,
    Skipped,
    Partial,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Absent => "ABSENT",
            Self::Empty => "EMPTY",
            Self::Published => "PUBLISHED",
            Self::Clearing => "CLEARING",
            Self::Skipped => "SKIPPED",
            Self::Partial => "PARTIAL",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Rows appended, after deleting the previous `replaced` rows.
    Published { rows: usize, replaced: usize },
    /// Rows already present and replacement was off.
    Skipped { existing: usize },
    /// Clearing stopped early; nothing was appended.
    Partial {
        deleted: usize,
        remaining: usize,
        reason: String,
    },
    /// A non-fatal error outside clearing.
    Failed { error: String },
    /// The partition had no records for the date.
    NoRows,
}

impl SyncOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Published { .. } => "published",
            Self::Skipped { .. } => "skipped",
            Self::Partial { .. } => "partial",
            Self::Failed { .. } => "failed",
            Self::NoRows => "no rows",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Result of syncing one partition for one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionReport {
    pub chain: ChainPartition,
    pub records: usize,
    pub outcome: SyncOutcome,
    /// States visited, in order.
    pub trace: Vec<SyncState>,
}

impl PartitionReport {
    pub fn worksheet(&self) -> &'static str {
        self.chain.worksheet_title()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateSyncReport {
    pub date: String,
    pub partitions: Vec<PartitionReport>,
}

impl DateSyncReport {
    pub fn published_rows(&self) -> usize {
        self.partitions
            .iter()
            .map(|report| match report.outcome {
                SyncOutcome::Published { rows, .. } => rows,
                _ => 0,
            })
            .sum()
    }

    pub fn has_failures(&self) -> bool {
        self.partitions
            .iter()
            .any(|report| report.outcome.is_failure())
    }

    /// Partitions whose outcome satisfies `predicate`.
    pub fn count(&self, predicate: impl Fn(&SyncOutcome) -> bool) -> usize {
        self.partitions
            .iter()
            .filter(|report| predicate(&report.outcome))
            .count()
    }
}

/// What the initial scan found.
enum Phase {
    /// `exists` is set when the worksheet is there but has no header row.
    Absent { exists: bool },
    Empty,
    Published { targets: Vec<usize> },
    Clearing { targets: Vec<usize> },
}

impl Phase {
    fn state(&self) -> SyncState {
        match self {
            Self::Absent { .. } => SyncState::Absent,
            Self::Empty => SyncState::Empty,
            Self::Published { .. } => SyncState::Published,
            Self::Clearing { .. } => SyncState::Clearing,
        }
    }
}

enum Clearing {
    Complete { deleted: usize },
    Stopped {
        deleted: usize,
        remaining: usize,
        reason: String,
    },
}

/// Sync every partition of one date, in sync order.
///
/// Partitions without records are reported as [`SyncOutcome::NoRows`] and
/// never touch the store. A fatal error stops the date immediately.
pub fn sync_date<S: WorksheetStore + ?Sized>(
    store: &mut S,
    date: &str,
    groups: &[ChainGroup],
    options: SyncOptions,
) -> Result<DateSyncReport> {
    let mut partitions = Vec::with_capacity(groups.len());
    for group in groups {
        let report = if group.is_empty() {
            PartitionReport {
                chain: group.chain,
                records: 0,
                outcome: SyncOutcome::NoRows,
                trace: Vec::new(),
            }
        } else {
            sync_partition(store, date, group, options)?
        };
        partitions.push(report);
    }
    Ok(DateSyncReport {
        date: date.to_string(),
        partitions,
    })
}

/// Drive one (partition, date) pair to a terminal state.
pub fn sync_partition<S: WorksheetStore + ?Sized>(
    store: &mut S,
    date: &str,
    group: &ChainGroup,
    options: SyncOptions,
) -> Result<PartitionReport> {
    let span = info_span!("sync", chain = %group.chain, date);
    let _guard = span.enter();

    let mut trace = Vec::new();
    let outcome = match run(store, date, group, options, &mut trace) {
        Ok(outcome) => outcome,
        Err(error) if error.is_fatal() => return Err(error),
        Err(error) => {
            warn!(%error, records = group.len(), "partition sync failed");
            SyncOutcome::Failed {
                error: error.to_string(),
            }
        }
    };
    Ok(PartitionReport {
        chain: group.chain,
        records: group.len(),
        outcome,
        trace,
    })
}

fn scan<S: WorksheetStore + ?Sized>(store: &mut S, title: &str, date: &str) -> Result<Phase> {
    if !store.has_worksheet(title)? {
        return Ok(Phase::Absent { exists: false });
    }
    let rows = store.read_rows(title)?;
    if rows.is_empty() {
        return Ok(Phase::Absent { exists: true });
    }
    let targets = date_row_indices(&rows, date);
    if targets.is_empty() {
        Ok(Phase::Empty)
    } else {
        Ok(Phase::Published { targets })
    }
}

fn run<S: WorksheetStore + ?Sized>(
    store: &mut S,
    date: &str,
    group: &ChainGroup,
    options: SyncOptions,
    trace: &mut Vec<SyncState>,
) -> Result<SyncOutcome> {
    let title = group.chain.worksheet_title();
    let mut replaced = 0;
    let mut phase = scan(store, title, date)?;
    loop {
        trace.push(phase.state());
        phase = match phase {
            Phase::Absent { exists } => {
                if !exists {
                    store.add_worksheet(title, NEW_WORKSHEET_ROWS, NEW_WORKSHEET_COLS)?;
                    info!(worksheet = title, "created worksheet");
                }
                let header: Vec<String> = WORKSHEET_HEADER.iter().map(|h| h.to_string()).collect();
                store.append_rows(title, &[header])?;
                Phase::Empty
            }
            Phase::Empty => {
                let rows = group.worksheet_rows();
                store.append_rows(title, &rows)?;
                trace.push(SyncState::Published);
                info!(rows = rows.len(), replaced, "published rows");
                return Ok(SyncOutcome::Published {
                    rows: rows.len(),
                    replaced,
                });
            }
            Phase::Published { targets } if !options.replace => {
                trace.push(SyncState::Skipped);
                warn!(
                    existing = targets.len(),
                    "rows already published for date, skipping without replacement"
                );
                return Ok(SyncOutcome::Skipped {
                    existing: targets.len(),
                });
            }
            Phase::Published { targets } => Phase::Clearing { targets },
            Phase::Clearing { targets } => {
                match clear(store, title, &targets, options.delete_batch_limit)? {
                    Clearing::Complete { deleted } => {
                        replaced = deleted;
                        Phase::Empty
                    }
                    Clearing::Stopped {
                        deleted,
                        remaining,
                        reason,
                    } => {
                        trace.push(SyncState::Partial);
                        warn!(
                            deleted,
                            remaining,
                            %reason,
                            "clearing incomplete, re-run to finish replacing this date"
                        );
                        return Ok(SyncOutcome::Partial {
                            deleted,
                            remaining,
                            reason,
                        });
                    }
                }
            }
        };
    }
}

fn clear<S: WorksheetStore + ?Sized>(
    store: &mut S,
    title: &str,
    targets: &[usize],
    limit: usize,
) -> Result<Clearing> {
    let plan = plan_deletions(targets, limit);
    let mut deleted = 0;
    for step in &plan.steps {
        let (start, end) = match *step {
            DeletionStep::Range { start, end } => (start, end),
            DeletionStep::Row(index) => (index, index),
        };
        match store.delete_rows(title, start, end) {
            Ok(()) => deleted += step.rows(),
            Err(error) if error.is_fatal() => return Err(error),
            Err(error) => {
                return Ok(Clearing::Stopped {
                    deleted,
                    remaining: targets.len() - deleted,
                    reason: error.to_string(),
                });
            }
        }
    }
    if plan.is_complete() {
        Ok(Clearing::Complete { deleted })
    } else {
        Ok(Clearing::Stopped {
            deleted,
            remaining: plan.remaining,
            reason: format!("delete batch limit of {limit} reached"),
        })
    }
}
