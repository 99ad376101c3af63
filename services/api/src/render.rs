use crate::infra::parse_date;
use chrono::{Local, NaiveDate};
use clap::Args;
use return_tracker::config::AppConfig;
use return_tracker::error::AppError;
use return_tracker::lookup::{
    queue_listing, ProjectedSnapshot, SearchOutcome, StatusLookup, StatusView, TrackerState,
};
use return_tracker::snapshot::{CsvExportSource, RelayClient, SnapshotSource};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct LookupArgs {
    /// Full name ("Jane Doe") or email address
    pub(crate) query: String,
    /// Date to project from (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Read records from a spreadsheet CSV export instead of the relay
    #[arg(long)]
    pub(crate) snapshot_csv: Option<PathBuf>,
    /// The CSV export starts with a data row rather than a header row
    #[arg(long, requires = "snapshot_csv")]
    pub(crate) no_headers: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct QueueArgs {
    /// Date to project from (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Read records from a spreadsheet CSV export instead of the relay
    #[arg(long)]
    pub(crate) snapshot_csv: Option<PathBuf>,
    /// The CSV export starts with a data row rather than a header row
    #[arg(long, requires = "snapshot_csv")]
    pub(crate) no_headers: bool,
}

pub(crate) async fn run_lookup(args: LookupArgs) -> Result<(), AppError> {
    let LookupArgs {
        query,
        today,
        snapshot_csv,
        no_headers,
    } = args;

    let lookup = build_lookup(snapshot_csv, no_headers)?;
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let (_, outcome) = lookup.search(TrackerState::new(), &query, today).await;

    match outcome? {
        SearchOutcome::Found { status } => render_status(&status),
        SearchOutcome::NotFound { message } => println!("{message}"),
    }
    Ok(())
}

pub(crate) async fn run_queue(args: QueueArgs) -> Result<(), AppError> {
    let QueueArgs {
        today,
        snapshot_csv,
        no_headers,
    } = args;

    let lookup = build_lookup(snapshot_csv, no_headers)?;
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let snapshot = lookup.retrieve(today).await?;
    render_queue(&snapshot);
    Ok(())
}

fn build_lookup(snapshot_csv: Option<PathBuf>, no_headers: bool) -> Result<StatusLookup, AppError> {
    let config = AppConfig::load()?;
    let source: Arc<dyn SnapshotSource> = match snapshot_csv {
        Some(path) if no_headers => Arc::new(CsvExportSource::new(path).without_headers()),
        Some(path) => Arc::new(CsvExportSource::new(path)),
        None => Arc::new(RelayClient::new(&config.relay)?),
    };
    Ok(StatusLookup::new(source, config.projection))
}

fn render_status(view: &StatusView) {
    println!("{}", view.name);
    println!("Status: {}", view.status_label);
    if let Some(position) = &view.position {
        println!("Queue position: {position}");
    }
    if let Some(completion) = &view.completion {
        println!("{}: {}", completion.label, completion.value);
        if let Some(note) = completion.note {
            println!("  {note}");
        }
    }
    println!("Progress: {}", progress_bar(view.progress_pct));
    println!("\nLast updated: {}", view.last_updated);
}

fn render_queue(snapshot: &ProjectedSnapshot) {
    println!("Return queue as of {}", snapshot.projected_from);
    println!("Last updated: {}", snapshot.last_updated_label());

    let entries = queue_listing(snapshot);
    if entries.is_empty() {
        println!("\nNo returns tracked.");
        return;
    }

    println!();
    for entry in entries {
        let rank = if entry.rank == 0 {
            "-".to_string()
        } else {
            entry.rank.to_string()
        };
        let projected = entry
            .projected_completion
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        println!(
            "{:>4}{} {:<28} {:<20} {}",
            rank,
            if entry.manual { "*" } else { " " },
            entry.name,
            entry.status_label,
            projected
        );
    }
    println!("\n* manually positioned");
}

fn progress_bar(pct: f32) -> String {
    let filled = ((pct.clamp(0.0, 100.0) / 5.0).round()) as usize;
    format!("[{}{}] {:.0}%", "#".repeat(filled), "-".repeat(20 - filled), pct)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_bar_has_fixed_width() {
        assert_eq!(progress_bar(0.0), format!("[{}] 0%", "-".repeat(20)));
        assert_eq!(progress_bar(100.0), format!("[{}] 100%", "#".repeat(20)));
        assert_eq!(progress_bar(60.0).matches('#').count(), 12);
    }
}
