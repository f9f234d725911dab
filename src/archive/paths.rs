//! Path resolution and startup validation.
//!
//! Runs once, before the poll loop: normalizes the target and output paths
//! to absolute form, verifies the target is an existing regular file,
//! creates the output directory when missing, and derives the snapshot
//! naming stem and extension for the lifetime of the run. Deriving the
//! name once means a rename of the target mid-run does not change how
//! snapshots are named.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// Errors that stop the archiver before the poll loop starts
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("target file not found: {0}")]
    TargetNotFound(PathBuf),

    #[error("target is not a regular file: {0}")]
    TargetNotRegular(PathBuf),

    #[error("output directory unavailable: {path}: {source}")]
    OutputDirUnavailable {
        path: PathBuf,
        source: io::Error,
    },

    #[error("poll interval must be a positive number of seconds, got {0}")]
    InvalidInterval(f64),
}

/// Absolute paths and naming scheme fixed at startup
#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    /// Absolute path of the file under observation
    pub target: PathBuf,

    /// Absolute path of the snapshot output directory
    pub outdir: PathBuf,

    /// Filename stem used for every snapshot, taken from the target's
    /// basename at startup
    pub stem: String,

    /// Extension (including the leading dot, or empty) used for every
    /// snapshot
    pub ext: String,
}

/// Resolve and validate the target file and output directory.
///
/// Creates the output directory (including parents) when it does not
/// exist yet; the creation is logged.
pub fn resolve(target: &Path, outdir: &Path) -> Result<ResolvedPaths, SetupError> {
    let target = fs::canonicalize(target)
        .map_err(|_| SetupError::TargetNotFound(target.to_path_buf()))?;

    let meta =
        fs::metadata(&target).map_err(|_| SetupError::TargetNotFound(target.clone()))?;
    if !meta.is_file() {
        return Err(SetupError::TargetNotRegular(target));
    }

    if !outdir.exists() {
        fs::create_dir_all(outdir).map_err(|source| SetupError::OutputDirUnavailable {
            path: outdir.to_path_buf(),
            source,
        })?;
        tracing::info!("created output directory: {}", outdir.display());
    }

    let outdir = fs::canonicalize(outdir).map_err(|source| SetupError::OutputDirUnavailable {
        path: outdir.to_path_buf(),
        source,
    })?;
    if !outdir.is_dir() {
        return Err(SetupError::OutputDirUnavailable {
            path: outdir,
            source: io::Error::new(io::ErrorKind::AlreadyExists, "exists but is not a directory"),
        });
    }

    let (stem, ext) = split_name(&target);

    Ok(ResolvedPaths {
        target,
        outdir,
        stem,
        ext,
    })
}

/// Validate the poll interval and convert it to a `Duration`.
pub fn validate_interval(secs: f64) -> Result<Duration, SetupError> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(SetupError::InvalidInterval(secs));
    }
    Ok(Duration::from_secs_f64(secs))
}

/// Split a target path into snapshot stem and extension.
///
/// The extension keeps its leading dot so names concatenate as
/// `<timestamp>_<stem><ext>`; files without an extension get an empty one.
fn split_name(target: &Path) -> (String, String) {
    let stem = target
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = target
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    (stem, ext)
}
