use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::debug;
use serde::{Deserialize, Serialize};

pub const PROGRAM_NAME: &str = "snapdiff";
pub const PROGRAM_LOG_LEVEL: &str = "SNAPDIFF_LOG_LEVEL";
/// Explicit settings file location, takes precedence over the XDG lookup.
pub const PROGRAM_CONFIG_ENV: &str = "SNAPDIFF_CONFIG";
pub const CONFIG_FILE_NAME: &str = "config.json";

/// File name patterns skipped by default when reading snapshots.
///
/// `.DS_Store` is Finder metadata and `._*` are AppleDouble sidecars that
/// macOS writes next to every file copied onto FAT/exFAT volumes. Neither
/// carries user content, and both churn between snapshots.
pub const DEFAULT_SKIP_PATTERNS: &[&str] = &[".DS_Store", "._*"];

pub fn snapdiff_config_dir() -> PathBuf {
    let base = match std::env::var_os("XDG_CONFIG_HOME") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::config_dir().unwrap_or_else(|| PathBuf::from(".config")),
    };
    base.join(PROGRAM_NAME)
}

/// Settings file path, honouring `SNAPDIFF_CONFIG` first.
pub fn default_config_path() -> PathBuf {
    match std::env::var_os(PROGRAM_CONFIG_ENV) {
        Some(p) if !p.is_empty() => PathBuf::from(p),
        _ => snapdiff_config_dir().join(CONFIG_FILE_NAME),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read settings from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// How the change report is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// One tagged line per change with an arrow to the destination.
    #[default]
    Narrative,
    /// Fixed nine-column layout with both sides spelled out.
    Table,
    /// Newline-delimited JSON.
    Json,
}

/// User defaults loaded from the settings file. Command line flags win.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub format: ReportFormat,
    /// Compare modification times with their full sub-second precision.
    pub nanosecond: bool,
    /// Apply [`DEFAULT_SKIP_PATTERNS`].
    pub default_excludes: bool,
    /// Additional gitignore-style patterns for paths to leave out.
    pub excludes: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            format: ReportFormat::Narrative,
            nanosecond: false,
            default_excludes: true,
            excludes: Vec::new(),
        }
    }
}

impl Settings {
    /// Load settings from the default location. A missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&default_config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No settings file at {}; using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Patterns the snapshot reader should skip, defaults first.
    pub fn skip_patterns(&self) -> Vec<String> {
        let defaults = self
            .default_excludes
            .then_some(DEFAULT_SKIP_PATTERNS)
            .unwrap_or_default();

        defaults
            .iter()
            .map(|p| (*p).to_owned())
            .chain(self.excludes.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
