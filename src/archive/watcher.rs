//! The timer-driven poll loop.
//!
//! Reads the target, compares against the last archived content, and
//! conditionally writes a snapshot, once per interval. Failures are
//! contained to their iteration: a vanished target or a failed copy is
//! logged and retried on the next poll, and the comparison baseline only
//! advances after a snapshot actually landed. Only the stop channel ends
//! the loop.

use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::time;

use super::detector::ChangeDetector;
use super::journal::{Journal, SnapshotRecord};
use super::paths::ResolvedPaths;
use super::snapshot::{ArchivedSnapshot, SnapshotError, SnapshotWriter};

/// What a single poll did
#[derive(Debug)]
pub enum PollOutcome {
    /// Content changed and a snapshot was written
    Archived(ArchivedSnapshot),

    /// Content matches the last archived state
    Unchanged,

    /// The target could not be read this iteration
    ReadFailed(std::io::Error),

    /// The snapshot copy failed; the baseline was not advanced
    WriteFailed(SnapshotError),
}

/// Counters accumulated over a watch run
#[derive(Debug, Clone, Copy, Default)]
pub struct WatchStats {
    pub polls: u64,
    pub snapshots: u64,
    pub unchanged: u64,
    pub read_failures: u64,
    pub write_failures: u64,
}

impl WatchStats {
    fn record(&mut self, outcome: &PollOutcome) {
        self.polls += 1;
        match outcome {
            PollOutcome::Archived(_) => self.snapshots += 1,
            PollOutcome::Unchanged => self.unchanged += 1,
            PollOutcome::ReadFailed(_) => self.read_failures += 1,
            PollOutcome::WriteFailed(_) => self.write_failures += 1,
        }
    }
}

/// Watches one file and archives every distinct content state.
///
/// Single owner of the comparison baseline: exactly one watcher polls one
/// target, so snapshots land in strictly the order changes were seen.
pub struct SnapshotWatcher {
    paths: ResolvedPaths,
    interval: Duration,
    detector: ChangeDetector,
    writer: SnapshotWriter,
    journal: Journal,
}

impl SnapshotWatcher {
    /// Create a watcher from resolved paths and a validated interval
    pub fn new(paths: ResolvedPaths, interval: Duration) -> Self {
        let writer = SnapshotWriter::new(&paths);
        let journal = Journal::new(&paths.outdir);
        Self {
            paths,
            interval,
            detector: ChangeDetector::new(),
            writer,
            journal,
        }
    }

    /// The resolved paths this watcher was built with
    pub fn paths(&self) -> &ResolvedPaths {
        &self.paths
    }

    /// One read/compare/archive pass
    pub async fn poll_once(&mut self) -> PollOutcome {
        let current = match tokio::fs::read(&self.paths.target).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("failed to read {}: {}", self.paths.target.display(), e);
                return PollOutcome::ReadFailed(e);
            }
        };

        if !self.detector.is_changed(&current) {
            tracing::debug!("no change in {}", self.paths.target.display());
            return PollOutcome::Unchanged;
        }

        match self.writer.write().await {
            Ok(snapshot) => {
                tracing::info!(
                    "content changed, saved copy to {}",
                    snapshot.path.display()
                );
                self.record_snapshot(&snapshot).await;
                self.detector.commit(current);
                PollOutcome::Archived(snapshot)
            }
            Err(e) => {
                tracing::warn!("failed to save snapshot: {}", e);
                PollOutcome::WriteFailed(e)
            }
        }
    }

    /// Ledger write; advisory, never affects loop state
    async fn record_snapshot(&self, snapshot: &ArchivedSnapshot) {
        let name = snapshot
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let record = SnapshotRecord {
            archived_at: Utc::now(),
            snapshot: name,
            bytes: snapshot.bytes,
        };
        if let Err(e) = self.journal.append(&record).await {
            tracing::warn!("failed to append journal record: {}", e);
        }
    }

    /// Poll until the stop channel fires.
    ///
    /// The delay is a fixed post-work sleep measured from the end of each
    /// iteration, not a fixed-rate schedule; drift under slow I/O is
    /// expected. The stop channel is checked at the top of every iteration
    /// and for the whole duration of the sleep.
    pub async fn run(&mut self, stop_rx: &mut mpsc::Receiver<()>) -> WatchStats {
        let mut stats = WatchStats::default();

        tracing::info!(
            "watching {} every {:.1}s, archiving to {}",
            self.paths.target.display(),
            self.interval.as_secs_f64(),
            self.paths.outdir.display()
        );

        loop {
            if stop_rx.try_recv().is_ok() {
                tracing::info!("watch stopped");
                break;
            }

            let outcome = self.poll_once().await;
            stats.record(&outcome);

            tokio::select! {
                _ = stop_rx.recv() => {
                    tracing::info!("watch stopped");
                    break;
                }
                _ = time::sleep(self.interval) => {}
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::paths;
    use tempfile::TempDir;

    fn watcher_for(temp: &TempDir, content: &[u8]) -> SnapshotWatcher {
        let target = temp.path().join("notes.txt");
        std::fs::write(&target, content).unwrap();
        let outdir = temp.path().join("out");
        let resolved = paths::resolve(&target, &outdir).unwrap();
        SnapshotWatcher::new(resolved, Duration::from_millis(10))
    }

    #[tokio::test]
    async fn test_first_poll_archives_initial_content() {
        let temp = TempDir::new().unwrap();
        let mut watcher = watcher_for(&temp, b"v1");

        let outcome = watcher.poll_once().await;
        let snap = match outcome {
            PollOutcome::Archived(s) => s,
            other => panic!("expected archive on first poll, got {:?}", other),
        };
        assert_eq!(std::fs::read(&snap.path).unwrap(), b"v1");
    }

    #[tokio::test]
    async fn test_vanished_target_is_contained() {
        let temp = TempDir::new().unwrap();
        let mut watcher = watcher_for(&temp, b"v1");

        std::fs::remove_file(temp.path().join("notes.txt")).unwrap();
        let outcome = watcher.poll_once().await;
        assert!(matches!(outcome, PollOutcome::ReadFailed(_)));
    }

    #[tokio::test]
    async fn test_stats_tally_outcomes() {
        let temp = TempDir::new().unwrap();
        let mut watcher = watcher_for(&temp, b"v1");
        let mut stats = WatchStats::default();

        stats.record(&watcher.poll_once().await); // archived
        stats.record(&watcher.poll_once().await); // unchanged
        std::fs::remove_file(temp.path().join("notes.txt")).unwrap();
        stats.record(&watcher.poll_once().await); // read failure

        assert_eq!(stats.polls, 3);
        assert_eq!(stats.snapshots, 1);
        assert_eq!(stats.unchanged, 1);
        assert_eq!(stats.read_failures, 1);
        assert_eq!(stats.write_failures, 0);
    }
}
