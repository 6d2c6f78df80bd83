//! Analysis trait abstractions
//!
//! These traits define the interface for swappable analysis backends.
//! The tempo backend is an external beat-tracking binary; key detection
//! and energy scoring are placeholders until real backends exist.

use crate::error::Result;
use crate::types::{Mode, Track};
use std::path::Path;

/// Beat tracking backend
pub trait BeatTracker: Send + Sync {
    /// Produce beat timestamps (seconds from the start of the file)
    fn track_beats(&self, path: &Path) -> Result<Vec<f64>>;

    /// Check if the backend can run at all (binary installed, etc.)
    fn is_available(&self) -> bool;

    /// Get the name of this tracker (for logging)
    fn name(&self) -> &'static str;
}

/// Musical key detection backend
pub trait KeyDetector: Send + Sync {
    /// Detect the key of an audio file
    ///
    /// Returns the pitch class index (0 = C .. 11 = B) and mode, or `None`
    /// when the key could not be determined.
    fn detect(&self, path: &Path) -> Result<Option<(u8, Mode)>>;

    /// Get the name of this detector (for logging)
    fn name(&self) -> &'static str;
}

/// Energy scoring used by the matching engine
pub trait EnergyScorer: Send + Sync {
    /// Energy sub-score in [0, 1] for a candidate track
    fn score(&self, candidate: &Track) -> f64;

    /// Get the name of this scorer (for logging)
    fn name(&self) -> &'static str;
}
