//! Audio analysis modules
//!
//! This module provides traits for analysis backends and concrete implementations.
//! The trait abstraction allows swapping backends without changing pipeline
//! or matching code.

pub mod analyzer;
pub mod bpm;
pub mod energy;
pub mod key;
pub mod metadata;
pub mod traits;

pub use analyzer::TrackAnalyzer;
pub use traits::{BeatTracker, EnergyScorer, KeyDetector};

// External beat tracker
pub use bpm::AubioBeatTracker;

// Placeholder implementations
pub use energy::PlaceholderEnergyScorer;
pub use key::PlaceholderKeyDetector;
