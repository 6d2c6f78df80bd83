//! Library discovery

pub mod scanner;

pub use scanner::{discover, read_track, scan, DiscoveredFile};
