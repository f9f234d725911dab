//! Command-line interface for snapwatch.
//!
//! Provides commands for watching a file continuously, taking a one-off
//! snapshot, listing the archive history, and inspecting configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;

use crate::archive::paths;
use crate::archive::{Journal, SnapshotRecord, SnapshotWatcher, SnapshotWriter};
use crate::config;

/// snapwatch - periodic file snapshot archiver
#[derive(Parser, Debug)]
#[command(name = "snapwatch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Watch a file and archive a timestamped copy on every change
    Watch {
        /// File to watch
        target: PathBuf,

        /// Poll interval in seconds
        #[arg(short, long, env = "SNAPWATCH_INTERVAL")]
        interval: Option<f64>,

        /// Output directory (created if absent)
        #[arg(short, long, env = "SNAPWATCH_OUTDIR")]
        outdir: Option<PathBuf>,
    },

    /// Take a single snapshot immediately and exit
    Snap {
        /// File to snapshot
        target: PathBuf,

        /// Output directory (created if absent)
        #[arg(short, long, env = "SNAPWATCH_OUTDIR")]
        outdir: Option<PathBuf>,
    },

    /// List archived snapshots
    History {
        /// Output directory holding the snapshots
        #[arg(short, long, env = "SNAPWATCH_OUTDIR")]
        outdir: Option<PathBuf>,

        /// Maximum number of entries to show, newest last
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Watch {
                target,
                interval,
                outdir,
            } => execute_watch(target, interval, outdir).await,
            Commands::Snap { target, outdir } => execute_snap(target, outdir).await,
            Commands::History { outdir, limit } => execute_history(outdir, limit).await,
            Commands::Config => execute_config().await,
        }
    }
}

/// Fill a missing interval from config-file defaults
fn resolve_interval(cli: Option<f64>, defaults: &config::ResolvedDefaults) -> Result<f64> {
    cli.or(defaults.interval_secs).context(
        "no poll interval given; pass --interval, set SNAPWATCH_INTERVAL, \
         or add defaults.interval_secs to the config file",
    )
}

/// Fill a missing output directory from config-file defaults
fn resolve_outdir(cli: Option<PathBuf>, defaults: &config::ResolvedDefaults) -> Result<PathBuf> {
    cli.or_else(|| defaults.outdir.clone()).context(
        "no output directory given; pass --outdir, set SNAPWATCH_OUTDIR, \
         or add defaults.outdir to the config file",
    )
}

/// Watch a file until Ctrl+C
async fn execute_watch(
    target: PathBuf,
    interval: Option<f64>,
    outdir: Option<PathBuf>,
) -> Result<()> {
    let defaults = config::load()?;
    let interval_secs = resolve_interval(interval, &defaults)?;
    let outdir = resolve_outdir(outdir, &defaults)?;

    let duration = paths::validate_interval(interval_secs)?;
    let resolved = paths::resolve(&target, &outdir)?;

    println!("👁️  Watching: {}", resolved.target.display());
    println!("    Interval: {} seconds", interval_secs);
    println!("    Output:   {}", resolved.outdir.display());
    println!("    Press Ctrl+C to stop");
    println!();

    let mut watcher = SnapshotWatcher::new(resolved, duration);

    // Relay Ctrl+C into the poll loop's stop channel
    let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        let _ = stop_tx.send(()).await;
    });

    let stats = watcher.run(&mut stop_rx).await;

    println!();
    println!("🛑 Watch stopped");
    println!("  Polls:          {}", stats.polls);
    println!("  Snapshots:      {}", stats.snapshots);
    println!("  Unchanged:      {}", stats.unchanged);
    if stats.read_failures > 0 {
        println!("  Read failures:  {}", stats.read_failures);
    }
    if stats.write_failures > 0 {
        println!("  Write failures: {}", stats.write_failures);
    }

    Ok(())
}

/// Take one unconditional snapshot
async fn execute_snap(target: PathBuf, outdir: Option<PathBuf>) -> Result<()> {
    let defaults = config::load()?;
    let outdir = resolve_outdir(outdir, &defaults)?;
    let resolved = paths::resolve(&target, &outdir)?;

    let writer = SnapshotWriter::new(&resolved);
    let snapshot = writer.write().await?;

    let journal = Journal::new(&resolved.outdir);
    let record = SnapshotRecord {
        archived_at: Utc::now(),
        snapshot: snapshot
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        bytes: snapshot.bytes,
    };
    if let Err(e) = journal.append(&record).await {
        tracing::warn!("failed to append journal record: {}", e);
    }

    println!("✅ Saved {} ({} bytes)", snapshot.path.display(), snapshot.bytes);

    Ok(())
}

/// List archived snapshots from the journal
async fn execute_history(outdir: Option<PathBuf>, limit: usize) -> Result<()> {
    let defaults = config::load()?;
    let outdir = resolve_outdir(outdir, &defaults)?;

    let journal = Journal::new(&outdir);
    let records = journal.replay().await?;

    if records.is_empty() {
        println!("No snapshots recorded in {}", outdir.display());
        return Ok(());
    }

    println!();
    println!("Snapshot History");
    println!("══════════════════════════════════════════════════════════════");
    println!();
    println!("Ledger: {}", journal.path().display());
    println!();

    let start = records.len().saturating_sub(limit);
    for record in &records[start..] {
        println!(
            "  [{}] {} ({} bytes)",
            record.archived_at.format("%Y-%m-%d %H:%M:%S"),
            record.snapshot,
            record.bytes
        );
    }

    println!();
    println!(
        "{} of {} snapshot(s) shown",
        records.len() - start,
        records.len()
    );

    Ok(())
}

/// Show resolved configuration
async fn execute_config() -> Result<()> {
    let defaults = config::load()?;

    println!();
    println!("snapwatch Configuration");
    println!("══════════════════════════════════════════════════════════════");
    println!();
    match &defaults.config_file {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: (none found)"),
    }
    println!();
    println!("Defaults:");
    match defaults.interval_secs {
        Some(secs) => println!("  interval_secs: {}", secs),
        None => println!("  interval_secs: (unset)"),
    }
    match &defaults.outdir {
        Some(dir) => println!("  outdir:        {}", dir.display()),
        None => println!("  outdir:        (unset)"),
    }
    println!();
    println!("Environment overrides: SNAPWATCH_INTERVAL, SNAPWATCH_OUTDIR");

    Ok(())
}
