use anyhow::{Context, Result, anyhow, bail};
use chrono::{Local, NaiveDate};
use comfy_table::Table;
use tracing::{info, info_span, warn};

use kino_cli::pipeline::{
    IngestResult, PipelinePaths, collect_dates, ingest, publish_candidates, publish_snapshot,
    reconcile_dates, secondary_sources,
};
use kino_cli::types::RunResult;
use kino_ingest::first_existing;
use kino_model::{ChainPartition, DATE_FORMAT};
use kino_sync::{RemoteConfig, SPREADSHEET_ID_ENV, SheetsClient, SyncOptions, WorksheetStore};

use crate::cli::{DestinationArgs, MergeArgs, PublishArgs};
use crate::summary::apply_table_style;

pub fn run_chains() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Order", "Chain", "Worksheet", "Matches"]);
    apply_table_style(&mut table);
    for (position, chain) in ChainPartition::ALL.into_iter().enumerate() {
        let matches = chain
            .pattern()
            .map_or_else(|| "anything else".to_string(), |p| format!("\"{p}\""));
        table.add_row(vec![
            (position + 1).to_string(),
            chain.label().to_string(),
            chain.worksheet_title().to_string(),
            matches,
        ]);
    }
    println!("{table}");
    println!("Patterns are checked in the order: multikino, cinema city, helios.");
    Ok(())
}

pub fn run_merge(args: &MergeArgs) -> Result<RunResult> {
    let paths = PipelinePaths {
        data_dir: args.data_dir.clone(),
        source_dir: args.source_dir.clone(),
    };
    let options = sync_options(&args.destination, !args.no_replace);

    // =========================================================================
    // Stage 1: Ingest - resolve exports, read and normalize them once
    // =========================================================================
    let ingest_span = info_span!("ingest", source_dir = %paths.source_dir.display());
    let IngestResult { tables, errors } = ingest_span.in_scope(|| -> Result<IngestResult> {
        let sources = secondary_sources(
            args.helios_csv.as_deref(),
            args.cinema_city_csv.as_deref(),
            &paths.source_dir,
        )?;
        Ok(ingest(&sources))
    })?;

    let dates = if args.dates.is_empty() {
        collect_dates(&tables)
    } else {
        let mut dates = args.dates.clone();
        dates.sort_unstable();
        dates.dedup();
        dates
    };
    if dates.is_empty() {
        bail!("no dates to process; pass --dates or provide exports with data");
    }
    info!(dates = %format_dates(&dates), "processing dates");

    // Connect before the first date: a fatal destination error must stop the
    // run with nothing written.
    let mut client = if args.no_sheets {
        None
    } else {
        let client = connect(&args.destination)?;
        if client.is_none() {
            warn!(
                "no spreadsheet id (pass --spreadsheet-id or set {SPREADSHEET_ID_ENV}), \
                 skipping sheets update"
            );
        }
        client
    };

    // =========================================================================
    // Stage 2-5: Merge, persist, classify and sync each date
    // =========================================================================
    let store = client.as_mut().map(|c| c as &mut dyn WorksheetStore);
    let mut result = reconcile_dates(&dates, &tables, &paths, store, options);
    result.errors.splice(0..0, errors);
    Ok(result)
}

pub fn run_publish(args: &PublishArgs) -> Result<RunResult> {
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let date_text = date.format(DATE_FORMAT).to_string();
    let path = match &args.csv {
        Some(path) => path.clone(),
        None => first_existing(&publish_candidates(&date_text))
            .ok_or_else(|| anyhow!("no CSV found for {date_text}; pass --csv"))?,
    };
    if !path.is_file() {
        bail!("CSV file not found: {}", path.display());
    }

    let mut client = connect(&args.destination)?.ok_or_else(|| {
        anyhow!("no spreadsheet id; pass --spreadsheet-id or set {SPREADSHEET_ID_ENV}")
    })?;
    let options = sync_options(&args.destination, args.replace);
    let summary = publish_snapshot(&path, date, &mut client, options)?;
    Ok(RunResult {
        dates: vec![summary],
        ..RunResult::default()
    })
}

fn sync_options(destination: &DestinationArgs, replace: bool) -> SyncOptions {
    SyncOptions::default()
        .with_replace(replace)
        .with_delete_batch_limit(destination.delete_batch_limit)
}

fn connect(destination: &DestinationArgs) -> Result<Option<SheetsClient>> {
    let Some(config) = RemoteConfig::from_env(
        destination.spreadsheet_id.as_deref(),
        destination.credentials.as_deref(),
    ) else {
        return Ok(None);
    };
    info!(
        credentials = %config.credentials_path.display(),
        "connecting to Google Sheets"
    );
    let client = SheetsClient::connect(&config)
        .with_context(|| format!("open spreadsheet {}", config.spreadsheet_id))?;
    Ok(Some(client))
}

fn format_dates(dates: &[NaiveDate]) -> String {
    dates
        .iter()
        .map(|date| date.format(DATE_FORMAT).to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
