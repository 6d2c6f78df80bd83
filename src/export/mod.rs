//! Library persistence

pub mod json;

pub use json::{load_tracks, save_tracks};
