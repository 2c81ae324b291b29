//! CLI entry point for the bibfetch tool.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use bibfetch_core::{
    BibEntry, Config, ConsoleProgress, Dispatcher, Downloader, EntryProcessor, FailureReport,
    FileNamePlan, PlannedAction, ProgressSink, RunSummary, SearchClient, TracingProgress,
    load_bibliography, plan_entry,
};
use clap::Parser;
use tracing::{debug, info, warn};

mod cli;

use cli::Args;

/// Written when the bibliography file does not exist. It has no URL, so a
/// run over it exercises the search fallback.
const EXAMPLE_BIBLIOGRAPHY: &str = "@article{vaswani2017attention,
  title={Attention is all you need},
  author={Vaswani, Ashish and others},
  year={2017}
}
";

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let config = load_config(&args)?;
    let run = &config.run;

    if !args.dry_run && !run.output_dir.exists() {
        std::fs::create_dir_all(&run.output_dir).with_context(|| {
            format!("failed to create output directory {}", run.output_dir.display())
        })?;
        println!("Created output directory: {}", run.output_dir.display());
    }

    if !run.bibliography.exists() {
        write_example_bibliography(&run.bibliography, args.dry_run)?;
        return Ok(ExitCode::SUCCESS);
    }

    println!("Parsing {}...", run.bibliography.display());
    let parsed = load_bibliography(&run.bibliography)?;
    for skipped in &parsed.skipped {
        warn!(skipped = %skipped, "skipped bibliography segment");
    }
    if parsed.entries.is_empty() {
        println!("No usable entries found in {}.", run.bibliography.display());
        for skipped in &parsed.skipped {
            println!("  skipped: {skipped}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let total = parsed.entries.len();
    println!(
        "Found {total} entries. Processing up to {} at a time...",
        run.max_parallel
    );
    if config.search.credentials().is_none() {
        println!(
            "Warning: search credentials are not configured; entries without a URL or arXiv eprint will fail."
        );
    }

    if args.dry_run {
        print_plan(&run.output_dir, &parsed.entries);
        return Ok(ExitCode::SUCCESS);
    }

    let progress: Arc<dyn ProgressSink> = if args.quiet {
        Arc::new(TracingProgress)
    } else {
        Arc::new(ConsoleProgress::new(total))
    };
    let processor = EntryProcessor::new(
        Downloader::new(&config.download)?,
        SearchClient::from_config(&config.search)?,
        &run.output_dir,
        progress,
    );
    let dispatcher = Dispatcher::new(run.max_parallel)?;

    println!("\n--- Downloading ---\n");
    let results = dispatcher.run_all(Arc::new(processor), parsed.entries).await?;
    let summary = RunSummary::from_results(&results);

    println!("\n--- Done ---");
    println!(
        "Succeeded: {}/{} ({} already present)",
        summary.succeeded, summary.total, summary.skipped
    );
    println!("Failed: {}", summary.failed);
    info!(
        total = summary.total,
        succeeded = summary.succeeded,
        skipped = summary.skipped,
        failed = summary.failed,
        "run complete"
    );

    if !summary.has_failures() {
        return Ok(ExitCode::SUCCESS);
    }

    FailureReport::write(&results, &run.report_path).with_context(|| {
        format!("failed to write failure report {}", run.report_path.display())
    })?;
    println!("Failure report: {}", run.report_path.display());
    Ok(ExitCode::FAILURE)
}

/// Defaults, then config file, then environment, then CLI flags.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = Config::load_layered(args.config.as_deref())?;
    config.apply_env_overrides();
    args.apply_to(&mut config);
    config.validate()?;
    Ok(config)
}

fn write_example_bibliography(path: &Path, dry_run: bool) -> Result<()> {
    println!("Bibliography file not found: {}", path.display());
    if dry_run {
        return Ok(());
    }
    std::fs::write(path, EXAMPLE_BIBLIOGRAPHY)
        .with_context(|| format!("failed to write example bibliography {}", path.display()))?;
    println!(
        "Created an example '{}' (one entry without a URL, to exercise the search fallback). Run again to process it.",
        path.display()
    );
    Ok(())
}

fn print_plan(output_dir: &Path, entries: &[BibEntry]) {
    let plan = FileNamePlan::new(entries.iter().map(BibEntry::title));
    for entry in entries {
        let file_name = plan.file_name(entry.title());
        match plan_entry(output_dir, entry, &file_name) {
            PlannedAction::Skip => println!("[skip] {file_name} (already exists)"),
            PlannedAction::Download { url } => println!("[download] {file_name} <- {url}"),
            PlannedAction::Search => println!("[search] {file_name}"),
        }
    }
}
