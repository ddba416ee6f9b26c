//! # AI Pulse
//!
//! A self-updating AI industry news tracker. A scheduled collector hands a
//! research task to an external LLM agent, which browses an allowlist of
//! official sources and rewrites the news snapshot (`data/current.json`).
//! A terminal reader presents that snapshot, filtered and sorted.
//!
//! ## Usage
//!
//! ```sh
//! ai_pulse collect      # one collection run, resuming the last agent session
//! ai_pulse read         # browse the snapshot
//! ai_pulse check        # audit the snapshot
//! ```
//!
//! ## Architecture
//!
//! 1. **Collect**: the agent reads `config/whitelist.json`, fetches sources,
//!    and writes new articles into the snapshot. The collector only streams
//!    the agent's output to the log and keeps `data/session.json` current so
//!    the next run resumes with its earlier turns as context.
//! 2. **Read**: load the snapshot once (HTTP or local file), then filter by
//!    category and sort by importance and recency for display.

use clap::Parser;
use std::error::Error;
use std::fs::File;
use tracing::{error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod agent;
mod cli;
mod collector;
mod config;
mod format;
mod models;
mod reader;
mod session;
mod snapshot;
mod utils;

use agent::claude_cli::ClaudeCli;
use cli::{CheckArgs, Cli, CollectArgs, Command};
use collector::run_collection;
use config::{CollectorSettings, load_whitelist};
use reader::{loader::SnapshotSource, run_reader};
use snapshot::{read_snapshot, validate};
use utils::ensure_writable_dir;

fn init_tracing(log_file: Option<File>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339());

    // The reader owns the terminal, so its logs go to a file.
    match log_file {
        Some(file) => builder.with_ansi(false).with_writer(file).init(),
        None => builder.init(),
    }
}

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();

    let log_file = match &args.command {
        Command::Read(read) => Some(File::create(&read.log_file)?),
        _ => None,
    };
    init_tracing(log_file);

    let start_time = std::time::Instant::now();
    info!(version = env!("CARGO_PKG_VERSION"), "ai_pulse starting up");

    let ok = match args.command {
        Command::Collect(collect) => collect_once(&collect).await?,
        Command::Read(read) => {
            let source = SnapshotSource::parse(&read.source)?;
            run_reader(source).await?;
            true
        }
        Command::Check(check) => check_snapshot(&check).await?,
    };

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

/// One collection run. Returns `false` when the agent failed.
async fn collect_once(args: &CollectArgs) -> Result<bool, Box<dyn Error>> {
    let settings = CollectorSettings::from_args(args)?;

    let data_dir = settings.resolve(&settings.data_dir);
    if let Err(e) = ensure_writable_dir(&data_dir).await {
        error!(
            path = %data_dir.display(),
            error = %e,
            "Data directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let runtime = ClaudeCli::new(&settings.agent_bin);
    match run_collection(&runtime, &settings).await {
        Ok(report) => {
            info!(
                session_id = report.session_id.as_deref().unwrap_or("-"),
                outcome = report.outcome.as_deref().unwrap_or("-"),
                added = report.articles_added,
                "Collector finished"
            );
            Ok(true)
        }
        Err(e) => {
            error!(error = %e, "Collection failed");
            Ok(false)
        }
    }
}

/// Audit the snapshot. Returns `false` if any problem was found.
async fn check_snapshot(args: &CheckArgs) -> Result<bool, Box<dyn Error>> {
    let whitelist = match load_whitelist(&args.whitelist).await {
        Ok(wl) => Some(wl),
        Err(e) => {
            warn!(error = %e, "Allowlist unavailable; skipping source check");
            None
        }
    };

    let snapshot = read_snapshot(&args.snapshot).await?;
    let issues = validate(&snapshot, whitelist.as_ref());
    for issue in &issues {
        println!("{issue}");
    }
    println!(
        "{}: {} articles, {} problems",
        args.snapshot.display(),
        snapshot.news.len(),
        issues.len()
    );
    Ok(issues.is_empty())
}
