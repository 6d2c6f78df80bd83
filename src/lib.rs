//! mixmatch - Harmonic mixing assistant for DJs
//!
//! Scans a music folder, estimates each track's tempo from beat timestamps
//! produced by an external beat tracker (aubiotrack), and recommends tracks
//! that mix well with a chosen one by BPM and Camelot key.
//!
//! # Architecture
//!
//! - `config`: CLI argument parsing and persisted settings
//! - `discovery`: Folder scanning and tag reading
//! - `analysis`: Camelot wheel, tempo estimation and analysis backends
//! - `matching`: Tempo compatibility and ranked recommendations
//! - `pipeline`: Cancellable scan/analysis jobs and the owned library store
//! - `export`: JSON persistence of the library
//!
//! # Example
//!
//! ```no_run
//! use mixmatch::matching::{find_matches_for, MatchOptions};
//! use mixmatch::pipeline::LibraryStore;
//! use std::path::Path;
//!
//! let store = LibraryStore::new();
//! store.load(Path::new("library.json")).expect("Cannot load library");
//! let tracks = store.snapshot();
//! for m in find_matches_for(&tracks[0], &tracks, &MatchOptions::default()) {
//!     println!("{:.2} {}", m.score, m.track.display_title());
//! }
//! ```

pub mod analysis;
pub mod config;
pub mod discovery;
pub mod error;
pub mod export;
pub mod matching;
pub mod pipeline;
pub mod types;

// Re-export key types at crate root
pub use error::{MixmatchError, Result};
pub use types::{MatchResult, MatchType, Mode, Track};
