//! Key detection module

pub mod camelot;

use crate::analysis::traits::KeyDetector;
use crate::error::Result;
use crate::types::Mode;
use std::path::Path;

/// Placeholder key detector
///
/// Never detects a key, so tracks keep `key`, `mode` and `camelot` unset
/// and the matching engine falls back to its neutral key score.
// TODO: replace with a chromagram-based detector so camelot codes get populated
pub struct PlaceholderKeyDetector;

impl PlaceholderKeyDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlaceholderKeyDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyDetector for PlaceholderKeyDetector {
    fn detect(&self, _path: &Path) -> Result<Option<(u8, Mode)>> {
        Ok(None)
    }

    fn name(&self) -> &'static str {
        "placeholder"
    }
}
