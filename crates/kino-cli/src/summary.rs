use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use kino_cli::types::{DateStatus, DateSummary, RunResult};
use kino_sync::{PartitionReport, SyncOutcome};

pub fn print_summary(result: &RunResult) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Date"),
        header_cell("Sources"),
        header_cell("Records"),
        header_cell("Dupes"),
        header_cell("Snapshot"),
        header_cell("Published"),
        header_cell("Skipped"),
        header_cell("Partial"),
        header_cell("Failed"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 2..=8 {
        if index != 4 {
            align_column(&mut table, index, CellAlignment::Right);
        }
    }
    align_column(&mut table, 4, CellAlignment::Center);

    let mut total_records = 0usize;
    let mut total_published = 0usize;
    for summary in &result.dates {
        total_records += summary.records;
        let (published, skipped, partial, failed) = match &summary.sync {
            Some(report) => {
                total_published += report.published_rows();
                (
                    Some(report.published_rows()),
                    Some(report.count(|o| matches!(o, SyncOutcome::Skipped { .. }))),
                    Some(report.count(|o| matches!(o, SyncOutcome::Partial { .. }))),
                    Some(report.count(SyncOutcome::is_failure)),
                )
            }
            None => (None, None, None, None),
        };
        table.add_row(vec![
            date_cell(summary),
            sources_cell(summary),
            Cell::new(summary.records),
            count_cell(Some(summary.duplicates_removed), Color::Yellow),
            snapshot_cell(summary),
            count_cell(published, Color::Green),
            count_cell(skipped, Color::Yellow),
            count_cell(partial, Color::Yellow),
            count_cell(failed, Color::Red),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{} dates", result.dates.len()))
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total_records).add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        count_cell(Some(total_published), Color::Green).add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        dim_cell("-"),
    ]);
    println!("{table}");
    print_sync_table(result);
    if result.aborted {
        eprintln!("Run aborted: remaining dates were not processed.");
    }
    if !result.errors.is_empty() {
        eprintln!("Errors:");
        for error in &result.errors {
            eprintln!("- {error}");
        }
    }
}

fn print_sync_table(result: &RunResult) {
    let rows: Vec<(&DateSummary, &PartitionReport)> = result
        .dates
        .iter()
        .filter_map(|summary| summary.sync.as_ref().map(|report| (summary, report)))
        .flat_map(|(summary, report)| {
            report
                .partitions
                .iter()
                .filter(|partition| partition.outcome != SyncOutcome::NoRows)
                .map(move |partition| (summary, partition))
        })
        .collect();
    if rows.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Date"),
        header_cell("Worksheet"),
        header_cell("Records"),
        header_cell("Outcome"),
        header_cell("Detail"),
        header_cell("States"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Center);
    for (summary, partition) in rows {
        let trace = partition
            .trace
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" > ");
        table.add_row(vec![
            Cell::new(summary.date),
            Cell::new(partition.worksheet())
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(partition.records),
            outcome_cell(&partition.outcome),
            Cell::new(outcome_detail(&partition.outcome)),
            dim_cell(trace),
        ]);
    }
    println!();
    println!("Sheets:");
    println!("{table}");
}

fn outcome_cell(outcome: &SyncOutcome) -> Cell {
    let cell = Cell::new(outcome.label().to_uppercase());
    match outcome {
        SyncOutcome::Published { .. } => cell.fg(Color::Green),
        SyncOutcome::Skipped { .. } | SyncOutcome::Partial { .. } => cell.fg(Color::Yellow),
        SyncOutcome::Failed { .. } => cell.fg(Color::Red).add_attribute(Attribute::Bold),
        SyncOutcome::NoRows => cell.fg(Color::DarkGrey),
    }
}

fn outcome_detail(outcome: &SyncOutcome) -> String {
    match outcome {
        SyncOutcome::Published { rows, replaced: 0 } => format!("{rows} rows appended"),
        SyncOutcome::Published { rows, replaced } => {
            format!("{replaced} rows replaced by {rows}")
        }
        SyncOutcome::Skipped { existing } => {
            format!("{existing} rows already present, re-run with replacement to update")
        }
        SyncOutcome::Partial {
            deleted,
            remaining,
            reason,
        } => format!("{deleted} deleted, {remaining} remaining ({reason})"),
        SyncOutcome::Failed { error } => error.clone(),
        SyncOutcome::NoRows => "-".to_string(),
    }
}

fn date_cell(summary: &DateSummary) -> Cell {
    let cell = Cell::new(summary.date);
    if summary.is_failure() {
        cell.fg(Color::Red).add_attribute(Attribute::Bold)
    } else {
        cell.fg(Color::Blue).add_attribute(Attribute::Bold)
    }
}

fn sources_cell(summary: &DateSummary) -> Cell {
    match &summary.status {
        DateStatus::Done => Cell::new(&summary.sources),
        DateStatus::NoData => dim_cell("no data"),
        DateStatus::Failed(error) => Cell::new(error).fg(Color::Red),
    }
}

fn snapshot_cell(summary: &DateSummary) -> Cell {
    match &summary.snapshot {
        Some(write) if write.previous_digest.is_none() => Cell::new("new").fg(Color::Green),
        Some(write) if write.unchanged() => dim_cell("unchanged"),
        Some(_) => Cell::new("updated").fg(Color::Green),
        None => dim_cell("-"),
    }
}

fn count_cell(count: Option<usize>, color: Color) -> Cell {
    match count {
        Some(value) if value > 0 => Cell::new(value).fg(color).add_attribute(Attribute::Bold),
        Some(value) => dim_cell(value),
        None => dim_cell("-"),
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
