//! Idempotent publishing of chain partitions to a worksheet store.

pub mod config;
pub mod engine;
pub mod error;
pub mod memory;
pub mod plan;
pub mod sheets;
pub mod store;

pub use config::{CREDENTIALS_ENV, RemoteConfig, SPREADSHEET_ID_ENV, credentials_path};
pub use engine::{
    DEFAULT_DELETE_BATCH_LIMIT, DateSyncReport, PartitionReport, SyncOptions, SyncOutcome,
    SyncState, sync_date, sync_partition,
};
pub use error::{RemoteError, Result};
pub use memory::{MemoryWorkbook, StoreOp};
pub use plan::{DeletionPlan, DeletionStep, date_row_indices, plan_deletions};
pub use sheets::SheetsClient;
pub use store::WorksheetStore;
