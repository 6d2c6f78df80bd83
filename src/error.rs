//! Unified error types for mixmatch
//!
//! Error strategy:
//! - Per-file errors (metadata, beat tracking): Recoverable, log and continue
//! - Library-wide errors (persistence, config, overlapping jobs): Surface to caller
//!
//! All errors include actionable suggestions where possible.

use std::path::PathBuf;
use thiserror::Error;

/// Audio formats picked up by the library scanner, for error messages
pub const SUPPORTED_FORMATS: &str = "MP3, M4A, FLAC, WAV, AIFF, AAC, OGG";

/// Top-level error type for mixmatch operations
#[derive(Debug, Error)]
pub enum MixmatchError {
    // =========================================================================
    // Recoverable errors - skip file, continue batch
    // =========================================================================
    #[error("Analysis failed for '{path}': {reason}")]
    AnalysisError { path: PathBuf, reason: String },

    #[error("Beat tracker timed out after {seconds}s on '{path}'\n  Tip: Raise the limit with --timeout or check the file is not corrupted")]
    AnalyzerTimeout { path: PathBuf, seconds: u64 },

    #[error("Failed to read tags from '{path}': {reason}")]
    MetadataError { path: PathBuf, reason: String },

    #[error("Unsupported audio format for '{path}': {format}\n  Supported formats: {SUPPORTED_FORMATS}")]
    UnsupportedFormat { path: PathBuf, format: String },

    #[error("File not found: '{0}'\n  Tip: Check the path exists and is accessible")]
    FileNotFound(PathBuf),

    // =========================================================================
    // Capability errors - analysis degrades to "unavailable"
    // =========================================================================
    #[error("Beat tracker unavailable: {reason}\n\n  To enable BPM analysis:\n  1. Install aubio (provides the aubiotrack binary):\n     brew install aubio   or   apt install aubio-tools\n  2. Or point mixmatch at the binary:\n     export MIXMATCH_ANALYZER=/path/to/aubiotrack")]
    AnalyzerUnavailable { reason: String },

    // =========================================================================
    // Library-wide errors - surface to the caller
    // =========================================================================
    #[error("Cannot access library file '{path}': {reason}\n  Tip: Run `mixmatch scan` to create it, or pass --library")]
    PersistenceError { path: PathBuf, reason: String },

    #[error("Another scan or analysis is already running")]
    Busy,

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for mixmatch operations
pub type Result<T> = std::result::Result<T, MixmatchError>;

impl MixmatchError {
    /// Returns true if this error is recoverable (should skip file, continue batch)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MixmatchError::AnalysisError { .. }
                | MixmatchError::AnalyzerTimeout { .. }
                | MixmatchError::MetadataError { .. }
                | MixmatchError::UnsupportedFormat { .. }
                | MixmatchError::FileNotFound(_)
                | MixmatchError::AnalyzerUnavailable { .. }
        )
    }

    /// Create an analysis error for a file
    pub fn analysis_error(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        MixmatchError::AnalysisError {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a persistence error, checking for common issues
    pub fn persistence_error(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        let reason = match err.kind() {
            std::io::ErrorKind::PermissionDenied => {
                format!("Permission denied. Check that you have access to {}", path.display())
            }
            std::io::ErrorKind::NotFound => "File does not exist".to_string(),
            _ => err.to_string(),
        };
        MixmatchError::PersistenceError { path, reason }
    }
}
