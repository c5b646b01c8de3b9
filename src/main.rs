use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use expense_sync::api::PreviewApi;
use expense_sync::config::{PassMode, SyncConfig};
use expense_sync::io::{DryRunSink, WorkbookStore};
use expense_sync::sync::{ExpenseSync, SyncReport};
use expense_sync::{Result, SyncError};

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        if let SyncError::Aborted { report, .. } = &error {
            eprintln!(
                "pass aborted after {} imported, {} skipped",
                report.synced,
                report.skipped.len()
            );
            for entry in &report.skipped {
                eprintln!("  {entry}");
            }
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging()?;
    match cli.command {
        Command::Sync(args) => execute_sync(args),
    }
}

fn execute_sync(args: SyncArgs) -> Result<()> {
    if !args.workbook.exists() {
        return Err(SyncError::MissingInput(args.workbook));
    }

    let mut config = match &args.config {
        Some(path) => SyncConfig::load(path)?,
        None => SyncConfig::default(),
    };
    if args.sandbox {
        config.mode = PassMode::Sandbox;
    }

    let store = WorkbookStore::new(&args.workbook, &config);
    let api = PreviewApi::default();
    let report = if args.dry_run {
        ExpenseSync::new(store.clone(), store, DryRunSink, api, config).sync()?
    } else {
        ExpenseSync::new(store.clone(), store.clone(), store, api, config).sync()?
    };

    report_outcome(&report);
    Ok(())
}

fn report_outcome(report: &SyncReport) {
    if report.skipped.is_empty() {
        println!(
            "All new expenses synced successfully ({} imported)",
            report.synced
        );
    } else {
        println!(
            "New expenses synced successfully, {} expenses were skipped",
            report.skipped.len()
        );
        for entry in &report.skipped {
            println!("  {entry}");
        }
    }
    for miss in &report.marker_misses {
        eprintln!("warning: no row found for expense id {miss}; marker not written");
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| SyncError::Logging(error.to_string()))
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Import pending expense rows from a workbook into the invoicing service."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one synchronisation pass.
    Sync(SyncArgs),
}

#[derive(clap::Args)]
struct SyncArgs {
    /// Workbook holding the expense and supplier sheets.
    #[arg(long)]
    workbook: PathBuf,

    /// Optional JSON configuration file (code tables, sheet names, mode).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use the sandbox category table and expense sheet.
    #[arg(long)]
    sandbox: bool,

    /// Run the full pass without writing import markers.
    #[arg(long)]
    dry_run: bool,
}
