//! snapwatch - Periodic file snapshot archiver
//!
//! Watches a single file on a timer and saves a timestamped copy into an
//! output directory every time its content changes. The history is
//! append-only: each distinct content state becomes one immutable snapshot
//! file, and no state that lasts at least one poll interval is ever lost.
//!
//! # Architecture
//!
//! The archiver is a single-task poll loop with per-stage error isolation:
//! - Setup resolves paths once and derives the snapshot naming scheme
//! - Each iteration reads the target, compares it byte-for-byte against the
//!   last archived content, and copies the file on change
//! - Read and write failures are contained to their iteration; only setup
//!   failures and operator interrupt stop the process
//!
//! # Modules
//!
//! - `archive`: The watch pipeline (paths, detector, snapshot writer, poll
//!   loop, journal)
//! - `config`: Optional YAML defaults file and resolution rules
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Watch a file, snapshotting changes every 5 seconds
//! snapwatch watch notes.txt --interval 5 --outdir ./snapshots
//!
//! # Take a single snapshot right now
//! snapwatch snap notes.txt --outdir ./snapshots
//!
//! # List what has been archived
//! snapwatch history --outdir ./snapshots
//! ```

pub mod archive;
pub mod cli;
pub mod config;

// Re-export main types at crate root for convenience
pub use archive::{
    ArchivedSnapshot, ChangeDetector, Journal, PollOutcome, ResolvedPaths, SetupError,
    SnapshotError, SnapshotRecord, SnapshotWatcher, SnapshotWriter, WatchStats,
};
