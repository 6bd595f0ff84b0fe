//! Patient Cache - replay a patient access log through a bounded LRU cache
//!
//! Loads the access CSV, simulates the tablet looking up each patient,
//! reports hit/miss statistics and writes the final cache contents to a CSV
//! snapshot.

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use patient_cache::ingest::load_patient_accesses;
use patient_cache::simulation::replay_until;
use patient_cache::tasks::{run_until_shutdown, shutdown_signal};
use patient_cache::{
    spawn_snapshot_task, BoundedCache, Config, PatientRecord, SimulationReport, PATIENT_HEADER,
};

#[derive(Parser)]
#[command(
    name = "patient_cache",
    about = "Replay patient accesses through a bounded LRU cache",
    long_about = None,
)]
struct Cli {
    /// Patient access CSV (patient_id, name, age, last_visit, access_timestamp, notes).
    input: PathBuf,

    /// Maximum cached patients (overrides CACHE_CAPACITY).
    capacity: Option<usize>,

    /// Snapshot destination (overrides SNAPSHOT_PATH).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the snapshot without a header row.
    #[arg(long)]
    no_header: bool,

    /// Number of most recently used patient IDs to list (overrides REPORT_TOP_N).
    #[arg(long)]
    top: Option<usize>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Seconds between background snapshots while replaying, 0 disables
    /// (overrides SNAPSHOT_INTERVAL).
    #[arg(long)]
    snapshot_interval: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only the report.
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "patient_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    let capacity = cli.capacity.unwrap_or(config.capacity);
    let output = cli.output.unwrap_or(config.snapshot_path);
    let interval = cli.snapshot_interval.unwrap_or(config.snapshot_interval);
    let top_n = cli.top.unwrap_or(config.top_n);
    let header = (!cli.no_header).then_some(PATIENT_HEADER);
    info!(
        "Configuration loaded: capacity={}, output={}, snapshot_interval={}s, top={}",
        capacity,
        output.display(),
        interval,
        top_n
    );

    let outcome = load_patient_accesses(&cli.input).with_context(|| {
        format!(
            "Error loading patient accesses from {}",
            cli.input.display()
        )
    })?;
    info!(
        "Loaded {} patient access records ({} skipped)",
        outcome.records.len(),
        outcome.skipped
    );

    let cache: Arc<BoundedCache<String, PatientRecord>> =
        Arc::new(BoundedCache::new(capacity).context("Cannot create cache")?);

    let snapshot_handle = (interval > 0)
        .then(|| spawn_snapshot_task(cache.clone(), output.clone(), header, interval));

    let records_loaded = outcome.records.len();
    let replay_cache = cache.clone();
    let records = outcome.records;
    let stop = Arc::new(AtomicBool::new(false));
    let replay_stop = stop.clone();
    let replay_task = tokio::task::spawn_blocking(move || {
        replay_until(&replay_cache, &records, &replay_stop)
    });
    let summary = run_until_shutdown(replay_task, &stop, shutdown_signal())
        .await
        .context("Replay task failed")?;
    if summary.interrupted {
        warn!(
            "Replay interrupted after {} of {} accesses",
            summary.processed, records_loaded
        );
    }
    info!(
        "Replayed {} accesses: {} hits, {} misses",
        summary.processed, summary.hits, summary.misses
    );

    if let Some(handle) = snapshot_handle {
        handle.abort();
        info!("Periodic snapshot task stopped");
    }

    let mut report = SimulationReport::new(
        cli.input.display().to_string(),
        records_loaded,
        outcome.skipped,
        &cache.stats(),
        cache.most_recent_keys(top_n),
    );

    let final_cache = cache.clone();
    let target = output.clone();
    match tokio::task::spawn_blocking(move || final_cache.snapshot(&target, header))
        .await
        .context("Snapshot task failed")?
    {
        Ok(rows) => report = report.with_snapshot(output.display().to_string(), rows),
        Err(e) => error!("Failed to write cache contents: {}", e),
    }

    match cli.format {
        Format::Text => print!("{}", report),
        Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}
