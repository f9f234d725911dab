//! Configuration defaults for snapwatch.
//!
//! Configuration sources (highest priority first):
//! 1. Command-line flags
//! 2. Environment variables (SNAPWATCH_INTERVAL, SNAPWATCH_OUTDIR,
//!    applied by clap as flag fallbacks)
//! 3. Config file (.snapwatch/config.yaml)
//!
//! A required value missing from all three is a setup error.
//!
//! Config file discovery:
//! - Searches the current directory and parents for .snapwatch/config.yaml
//! - Falls back to ~/.snapwatch/config.yaml
//! - Paths in the config file are relative to the directory containing
//!   .snapwatch

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub defaults: DefaultsSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DefaultsSection {
    /// Poll interval in seconds
    pub interval_secs: Option<f64>,

    /// Output directory (relative to the config file's location)
    pub outdir: Option<String>,
}

/// Defaults resolved from the config file, if one was found
#[derive(Debug, Clone, Default)]
pub struct ResolvedDefaults {
    pub interval_secs: Option<f64>,
    pub outdir: Option<PathBuf>,

    /// Path of the config file the defaults came from
    pub config_file: Option<PathBuf>,
}

/// Load defaults from the discovered config file, or empty defaults when
/// there is none. A config file that exists but cannot be parsed is a hard
/// error, not a silent fallback.
pub fn load() -> Result<ResolvedDefaults> {
    match find_config_file() {
        Some(path) => load_from(&path),
        None => Ok(ResolvedDefaults::default()),
    }
}

/// Load defaults from a specific config file
pub fn load_from(config_path: &Path) -> Result<ResolvedDefaults> {
    let raw = std::fs::read_to_string(config_path)
        .with_context(|| format!("failed to read config file {}", config_path.display()))?;
    let parsed: ConfigFile = serde_yaml::from_str(&raw)
        .with_context(|| format!("failed to parse config file {}", config_path.display()))?;

    // <dir>/.snapwatch/config.yaml resolves relative paths against <dir>
    let base = config_path
        .parent()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let outdir = parsed.defaults.outdir.map(|raw| {
        let path = PathBuf::from(raw);
        if path.is_absolute() {
            path
        } else {
            base.join(path)
        }
    });

    Ok(ResolvedDefaults {
        interval_secs: parsed.defaults.interval_secs,
        outdir,
        config_file: Some(config_path.to_path_buf()),
    })
}

/// Find a config file by searching the current directory and parents, then
/// the home directory
fn find_config_file() -> Option<PathBuf> {
    if let Ok(mut current) = std::env::current_dir() {
        loop {
            let candidate = current.join(".snapwatch").join("config.yaml");
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                break;
            }
        }
    }

    let home = dirs::home_dir()?;
    let candidate = home.join(".snapwatch").join("config.yaml");
    if candidate.exists() {
        Some(candidate)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &Path, body: &str) -> PathBuf {
        let config_dir = dir.join(".snapwatch");
        std::fs::create_dir_all(&config_dir).unwrap();
        let path = config_dir.join("config.yaml");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_defaults_parse() {
        let temp = TempDir::new().unwrap();
        let path = write_config(
            temp.path(),
            "version: \"1\"\ndefaults:\n  interval_secs: 2.5\n  outdir: snapshots\n",
        );

        let defaults = load_from(&path).unwrap();
        assert_eq!(defaults.interval_secs, Some(2.5));
        assert_eq!(defaults.outdir, Some(temp.path().join("snapshots")));
        assert_eq!(defaults.config_file, Some(path));
    }

    #[test]
    fn test_absolute_outdir_is_kept() {
        let temp = TempDir::new().unwrap();
        let path = write_config(
            temp.path(),
            "version: \"1\"\ndefaults:\n  outdir: /var/tmp/snapshots\n",
        );

        let defaults = load_from(&path).unwrap();
        assert_eq!(defaults.outdir, Some(PathBuf::from("/var/tmp/snapshots")));
        assert_eq!(defaults.interval_secs, None);
    }

    #[test]
    fn test_empty_defaults_section() {
        let temp = TempDir::new().unwrap();
        let path = write_config(temp.path(), "version: \"1\"\n");

        let defaults = load_from(&path).unwrap();
        assert_eq!(defaults.interval_secs, None);
        assert_eq!(defaults.outdir, None);
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = write_config(temp.path(), "version: [not, a, string");

        assert!(load_from(&path).is_err());
    }
}
