//! Append-only snapshot ledger.
//!
//! A JSONL file kept next to the snapshots (`.history.jsonl` in the output
//! directory, dot-prefixed so it stays out of the snapshot namespace), one
//! record per archived snapshot. Writes append and flush; reads replay the
//! whole file. The ledger is advisory: the snapshot files themselves are
//! the source of truth, so replay skips lines it cannot parse instead of
//! failing, and append errors never interrupt the poll loop.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Ledger filename within the output directory
pub const JOURNAL_FILE: &str = ".history.jsonl";

/// Errors that can occur with the journal
#[derive(Debug, Error)]
pub enum JournalError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// One archived snapshot, as recorded in the ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotRecord {
    /// When the snapshot was archived
    pub archived_at: DateTime<Utc>,

    /// Snapshot filename within the output directory
    pub snapshot: String,

    /// Size of the snapshot in bytes
    pub bytes: u64,
}

/// JSONL ledger of archived snapshots
pub struct Journal {
    path: PathBuf,
}

impl Journal {
    /// Create a journal rooted in the given output directory
    pub fn new(outdir: &Path) -> Self {
        Self {
            path: outdir.join(JOURNAL_FILE),
        }
    }

    /// Path of the ledger file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record to the ledger
    pub async fn append(&self, record: &SnapshotRecord) -> Result<(), JournalError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        let json = serde_json::to_string(record)?;
        file.write_all(format!("{}\n", json).as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }

    /// Read all records back, oldest first.
    ///
    /// A missing ledger is an empty history, not an error.
    pub async fn replay(&self) -> Result<Vec<SnapshotRecord>, JournalError> {
        let file = match File::open(&self.path).await {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        let mut lines = BufReader::new(file).lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<SnapshotRecord>(&line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!("skipping malformed journal line: {}", e);
                }
            }
        }

        Ok(records)
    }
}
