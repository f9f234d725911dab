//! Timestamped snapshot writing.
//!
//! Copies the target's current on-disk bytes into the output directory
//! under `<YYYYMMDD_HHMMSS>_<stem><ext>`. The copy is staged in a
//! temporary file inside the output directory and renamed into place, so
//! readers of the directory never see a partial snapshot under a final
//! name. The target's modification time is carried onto the snapshot when
//! the platform allows it.

use std::fs;
use std::io;
use std::path::PathBuf;

use chrono::Local;
use filetime::FileTime;
use thiserror::Error;

use super::paths::ResolvedPaths;

/// Timestamp layout used in snapshot filenames, whole-second resolution
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Errors from a single snapshot attempt, recoverable at the poll loop
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to stage snapshot in {outdir}: {source}")]
    Stage {
        outdir: PathBuf,
        source: io::Error,
    },

    #[error("failed to copy {target}: {source}")]
    Copy {
        target: PathBuf,
        source: io::Error,
    },

    #[error("failed to publish snapshot {path}: {source}")]
    Publish {
        path: PathBuf,
        source: io::Error,
    },
}

/// A successfully written snapshot
#[derive(Debug, Clone)]
pub struct ArchivedSnapshot {
    /// Final path of the snapshot file
    pub path: PathBuf,

    /// Number of bytes copied
    pub bytes: u64,
}

/// Writes timestamped copies of one target file.
///
/// The stem and extension come from path resolution at startup and stay
/// fixed for the writer's lifetime.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    target: PathBuf,
    outdir: PathBuf,
    stem: String,
    ext: String,
}

impl SnapshotWriter {
    /// Create a writer from resolved paths
    pub fn new(paths: &ResolvedPaths) -> Self {
        Self {
            target: paths.target.clone(),
            outdir: paths.outdir.clone(),
            stem: paths.stem.clone(),
            ext: paths.ext.clone(),
        }
    }

    /// Copy the target's current content into a new timestamped snapshot.
    pub async fn write(&self) -> Result<ArchivedSnapshot, SnapshotError> {
        let stamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let dest = self.dest_for_stamp(&stamp);

        let staged = tempfile::Builder::new()
            .prefix(".snapwatch-")
            .tempfile_in(&self.outdir)
            .map_err(|source| SnapshotError::Stage {
                outdir: self.outdir.clone(),
                source,
            })?;

        // Copy from disk, not from the compared buffer, so the snapshot
        // reflects the file itself and keeps its permission bits
        let bytes = tokio::fs::copy(&self.target, staged.path())
            .await
            .map_err(|source| SnapshotError::Copy {
                target: self.target.clone(),
                source,
            })?;

        // Carry the target's mtime onto the snapshot, best effort
        match fs::metadata(&self.target) {
            Ok(meta) => {
                let mtime = FileTime::from_last_modification_time(&meta);
                if let Err(e) = filetime::set_file_mtime(staged.path(), mtime) {
                    tracing::debug!("could not set snapshot mtime: {}", e);
                }
            }
            Err(e) => {
                tracing::debug!("could not read target mtime: {}", e);
            }
        }

        staged
            .persist(&dest)
            .map_err(|e| SnapshotError::Publish {
                path: dest.clone(),
                source: e.error,
            })?;

        Ok(ArchivedSnapshot { path: dest, bytes })
    }

    /// Snapshot path for a given timestamp string.
    ///
    /// When the plain `<stamp>_<stem><ext>` name is already taken (more
    /// than one change inside the same second), a numeric suffix is
    /// inserted before the extension rather than overwriting the earlier
    /// snapshot.
    pub fn dest_for_stamp(&self, stamp: &str) -> PathBuf {
        let base = self
            .outdir
            .join(format!("{}_{}{}", stamp, self.stem, self.ext));
        if !base.exists() {
            return base;
        }

        let mut n: u32 = 2;
        loop {
            let candidate = self
                .outdir
                .join(format!("{}_{}.{}{}", stamp, self.stem, n, self.ext));
            if !candidate.exists() {
                return candidate;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::paths;
    use tempfile::TempDir;

    fn writer_for(temp: &TempDir, name: &str, content: &[u8]) -> SnapshotWriter {
        let target = temp.path().join(name);
        fs::write(&target, content).unwrap();
        let outdir = temp.path().join("out");
        let resolved = paths::resolve(&target, &outdir).unwrap();
        SnapshotWriter::new(&resolved)
    }

    #[test]
    fn test_dest_uses_stamp_stem_and_extension() {
        let temp = TempDir::new().unwrap();
        let writer = writer_for(&temp, "notes.txt", b"v1");

        let dest = writer.dest_for_stamp("20250101_120000");
        assert_eq!(
            dest.file_name().unwrap().to_str().unwrap(),
            "20250101_120000_notes.txt"
        );
    }

    #[test]
    fn test_dest_without_extension() {
        let temp = TempDir::new().unwrap();
        let writer = writer_for(&temp, "Makefile", b"all:");

        let dest = writer.dest_for_stamp("20250101_120000");
        assert_eq!(
            dest.file_name().unwrap().to_str().unwrap(),
            "20250101_120000_Makefile"
        );
    }

    #[test]
    fn test_same_second_collisions_get_suffixes() {
        let temp = TempDir::new().unwrap();
        let writer = writer_for(&temp, "notes.txt", b"v1");
        let outdir = temp.path().join("out");

        fs::write(outdir.join("20250101_120000_notes.txt"), b"first").unwrap();
        let second = writer.dest_for_stamp("20250101_120000");
        assert_eq!(
            second.file_name().unwrap().to_str().unwrap(),
            "20250101_120000_notes.2.txt"
        );

        fs::write(&second, b"second").unwrap();
        let third = writer.dest_for_stamp("20250101_120000");
        assert_eq!(
            third.file_name().unwrap().to_str().unwrap(),
            "20250101_120000_notes.3.txt"
        );
    }

    #[tokio::test]
    async fn test_write_copies_exact_bytes() {
        let temp = TempDir::new().unwrap();
        let writer = writer_for(&temp, "notes.txt", b"hello snapshot");

        let snap = writer.write().await.unwrap();

        assert_eq!(snap.bytes, 14);
        assert_eq!(fs::read(&snap.path).unwrap(), b"hello snapshot");
    }

    #[tokio::test]
    async fn test_write_leaves_no_staging_files() {
        let temp = TempDir::new().unwrap();
        let writer = writer_for(&temp, "notes.txt", b"v1");
        let outdir = temp.path().join("out");

        writer.write().await.unwrap();

        let leftovers: Vec<_> = fs::read_dir(&outdir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.file_name()
                    .to_string_lossy()
                    .starts_with(".snapwatch-")
            })
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn test_write_fails_when_outdir_vanishes() {
        let temp = TempDir::new().unwrap();
        let writer = writer_for(&temp, "notes.txt", b"v1");
        let outdir = temp.path().join("out");

        fs::remove_dir_all(&outdir).unwrap();
        let err = writer.write().await.unwrap_err();
        assert!(matches!(err, SnapshotError::Stage { .. }));
    }
}
