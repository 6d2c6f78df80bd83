//! Persisted settings
//!
//! Stored as JSON. Location: `MIXMATCH_CONFIG_PATH` if set, otherwise
//! `settings.json` in the per-user config directory. A missing file means
//! defaults.

use crate::analysis::bpm::beat_tracker::DEFAULT_TIMEOUT;
use crate::error::{MixmatchError, Result};
use crate::matching::DEFAULT_TOLERANCE;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Environment variable overriding the settings file location
pub const CONFIG_PATH_ENV: &str = "MIXMATCH_CONFIG_PATH";

/// Valid range for the BPM tolerance
pub const TOLERANCE_RANGE: std::ops::RangeInclusive<f64> = 1.0..=10.0;

/// User settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Music folder scanned by default
    pub library_root: Option<PathBuf>,
    /// Default direct-match tolerance in BPM
    pub bpm_tolerance: f64,
    /// Explicit aubiotrack location
    pub analyzer_path: Option<PathBuf>,
    /// Per-file beat tracker time limit
    pub analyzer_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            library_root: None,
            bpm_tolerance: DEFAULT_TOLERANCE,
            analyzer_path: None,
            analyzer_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl Settings {
    /// Load settings from a file, returning defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content).map_err(|e| {
            MixmatchError::ConfigError(format!("Cannot parse {}: {}", path.display(), e))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Write settings to a file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| MixmatchError::ConfigError(e.to_string()))?;
        fs::write(path, content)?;
        debug!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Perform basic validation checks
    pub fn validate(&self) -> Result<()> {
        if !TOLERANCE_RANGE.contains(&self.bpm_tolerance) {
            return Err(MixmatchError::ConfigError(format!(
                "bpm_tolerance must be between {} and {}, got {}",
                TOLERANCE_RANGE.start(),
                TOLERANCE_RANGE.end(),
                self.bpm_tolerance
            )));
        }
        if self.analyzer_timeout_secs == 0 {
            return Err(MixmatchError::ConfigError(
                "analyzer_timeout_secs must be >= 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn analyzer_timeout(&self) -> Duration {
        Duration::from_secs(self.analyzer_timeout_secs)
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "mixmatch")
}

/// Resolve the settings path from an explicit path, the environment or the
/// per-user config directory
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }
    project_dirs()
        .map(|dirs| dirs.config_dir().join("settings.json"))
        .ok_or_else(|| MixmatchError::ConfigError("Could not determine config directory".to_string()))
}

/// Resolve the library file from an explicit path or the per-user data directory
pub fn resolve_library_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    project_dirs()
        .map(|dirs| dirs.data_dir().join("library.json"))
        .ok_or_else(|| MixmatchError::ConfigError("Could not determine data directory".to_string()))
}
