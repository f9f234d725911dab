//! File snapshot archiving pipeline.
//!
//! This module contains everything between "a path to watch" and "a
//! directory full of timestamped copies":
//!
//! 1. **Paths**: resolves target/output paths and derives snapshot naming
//! 2. **Detector**: byte-exact change detection against the last archive
//! 3. **Snapshot**: atomic timestamped copies into the output directory
//! 4. **Watcher**: the timer-driven poll loop tying the stages together
//! 5. **Journal**: append-only JSONL ledger of what was archived
//!
//! # Architecture
//!
//! ```text
//! target file → Watcher (poll loop) → Detector → SnapshotWriter
//!                                         ↓            ↓
//!                                    LastContent   .history.jsonl
//! ```

pub mod detector;
pub mod journal;
pub mod paths;
pub mod snapshot;
pub mod watcher;

// Re-export key types
pub use detector::ChangeDetector;
pub use journal::{Journal, SnapshotRecord};
pub use paths::{ResolvedPaths, SetupError};
pub use snapshot::{ArchivedSnapshot, SnapshotError, SnapshotWriter};
pub use watcher::{PollOutcome, SnapshotWatcher, WatchStats};
