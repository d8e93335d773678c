//! Reconciliation core: normalize source tables, merge them by priority,
//! and partition the result by cinema chain.

pub mod classify;
pub mod error;
pub mod merge;
pub mod normalize;

pub use classify::{ChainGroup, partition_by_chain};
pub use error::{MergeError, NormalizeError};
pub use merge::{MergedSet, SourceContribution, merge_sources};
pub use normalize::{NormalizedTable, normalize_table};
