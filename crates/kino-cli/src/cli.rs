//! CLI argument definitions for `kino`.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;
use kino_sync::DEFAULT_DELETE_BATCH_LIMIT;

#[derive(Parser)]
#[command(
    name = "kino",
    version,
    about = "Reconcile cinema screening exports and publish them to Google Sheets",
    long_about = "Merge screening data from the aggregator snapshot, Helios and Cinema City\n\
                  exports into one canonical CSV per date, then publish each cinema chain\n\
                  to its own worksheet. Re-running a date replaces its rows instead of\n\
                  duplicating them."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Merge all sources per date, save snapshots and update the sheets.
    Merge(MergeArgs),

    /// Publish one canonical CSV for one date.
    Publish(PublishArgs),

    /// List chain partitions and their worksheets.
    Chains,
}

/// Google Sheets destination flags.
#[derive(Args)]
pub struct DestinationArgs {
    /// Spreadsheet id (default: $GOOGLE_SPREADSHEET_ID).
    #[arg(long = "spreadsheet-id", value_name = "ID")]
    pub spreadsheet_id: Option<String>,

    /// Service-account key file (default: $GOOGLE_APPLICATION_CREDENTIALS,
    /// then ~/.config/gspread/service_account.json).
    #[arg(long = "credentials", value_name = "PATH")]
    pub credentials: Option<PathBuf>,

    /// Maximum single-row deletions per worksheet and date in one run.
    #[arg(
        long = "delete-batch-limit",
        value_name = "N",
        default_value_t = DEFAULT_DELETE_BATCH_LIMIT
    )]
    pub delete_batch_limit: usize,
}

#[derive(Parser)]
pub struct MergeArgs {
    /// Dates to process (default: every date found in the Helios and Cinema
    /// City exports).
    #[arg(long = "dates", value_name = "YYYY-MM-DD", num_args = 1..)]
    pub dates: Vec<NaiveDate>,

    /// Helios events export; `*` in the file name picks the newest match
    /// (default: newest <SOURCE_DIR>/helios_events_*.csv).
    #[arg(long = "helios-csv", value_name = "PATH")]
    pub helios_csv: Option<PathBuf>,

    /// Cinema City export; `*` in the file name picks the newest match
    /// (default: newest <SOURCE_DIR>/cinema_city_*.csv).
    #[arg(long = "cinema-city-csv", value_name = "PATH")]
    pub cinema_city_csv: Option<PathBuf>,

    /// Directory for canonical snapshots.
    #[arg(long = "data-dir", value_name = "DIR", default_value = "data/daily")]
    pub data_dir: PathBuf,

    /// Directory holding scraper exports.
    #[arg(long = "source-dir", value_name = "DIR", default_value = "cinema_data")]
    pub source_dir: PathBuf,

    #[command(flatten)]
    pub destination: DestinationArgs,

    /// Save snapshots only; do not touch Google Sheets.
    #[arg(long = "no-sheets")]
    pub no_sheets: bool,

    /// Keep rows already published for a date instead of replacing them.
    #[arg(long = "no-replace")]
    pub no_replace: bool,
}

#[derive(Parser)]
pub struct PublishArgs {
    /// Date to publish (default: today).
    #[arg(long = "date", value_name = "YYYY-MM-DD")]
    pub date: Option<NaiveDate>,

    /// Canonical CSV to publish (default: first of cinema_data/cinema_<DATE>.csv,
    /// data/daily/cinema_<DATE>.csv, cinema_<DATE>.csv).
    #[arg(long = "csv", value_name = "PATH")]
    pub csv: Option<PathBuf>,

    #[command(flatten)]
    pub destination: DestinationArgs,

    /// Replace rows already published for the date.
    #[arg(long = "replace")]
    pub replace: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
