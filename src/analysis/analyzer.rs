//! Per-track enrichment
//!
//! Combines the beat tracker, the tempo estimator and the key detector into
//! a single step that never fails: whatever cannot be determined is left as
//! it was.

use crate::analysis::bpm::estimate_bpm;
use crate::analysis::traits::{BeatTracker, KeyDetector};
use crate::analysis::{AubioBeatTracker, PlaceholderKeyDetector};
use crate::types::Track;
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Enriches tracks with BPM (and key, once a detector exists)
#[derive(Clone)]
pub struct TrackAnalyzer {
    beat_tracker: Arc<dyn BeatTracker>,
    key_detector: Arc<dyn KeyDetector>,
}

impl TrackAnalyzer {
    pub fn new(beat_tracker: Arc<dyn BeatTracker>, key_detector: Arc<dyn KeyDetector>) -> Self {
        Self {
            beat_tracker,
            key_detector,
        }
    }

    /// Whether BPM analysis can run at all
    ///
    /// Callers should check this once and warn, rather than relying on
    /// per-file failures.
    pub fn is_available(&self) -> bool {
        self.beat_tracker.is_available()
    }

    pub fn beat_tracker_name(&self) -> &'static str {
        self.beat_tracker.name()
    }

    /// Estimate the BPM of one file, `None` when unavailable
    pub fn analyze_bpm(&self, path: &Path) -> Option<f64> {
        if !self.beat_tracker.is_available() {
            return None;
        }

        match self.beat_tracker.track_beats(path) {
            Ok(beats) => {
                let bpm = estimate_bpm(&beats);
                if bpm.is_none() {
                    debug!("Not enough usable beats in {}", path.display());
                }
                bpm
            }
            Err(e) if e.is_recoverable() => {
                warn!("BPM analysis failed for {}: {}", path.display(), e);
                None
            }
            Err(e) => {
                error!("BPM analysis error on {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Return an updated copy of the track
    ///
    /// BPM and key are replaced only when a new value was determined;
    /// `last_analyzed` is always refreshed.
    pub fn analyze_track(&self, track: &Track) -> Track {
        let mut updated = track.clone();
        let path = Path::new(&track.path);

        if let Some(bpm) = self.analyze_bpm(path) {
            updated.bpm = Some(bpm);
        }

        match self.key_detector.detect(path) {
            Ok(Some((key, mode))) => {
                if !updated.set_key(key, mode) {
                    warn!(
                        "Key detection ({}) returned invalid pitch class {} for {}",
                        self.key_detector.name(),
                        key,
                        path.display()
                    );
                }
            }
            Ok(None) => {}
            Err(e) => warn!(
                "Key detection ({}) failed for {}: {}",
                self.key_detector.name(),
                path.display(),
                e
            ),
        }

        updated.last_analyzed = Some(Utc::now());

        debug!(
            "Analyzed {}: BPM={}, Key={}",
            updated.display_title(),
            updated.bpm.map(|b| format!("{:.1}", b)).unwrap_or_else(|| "-".into()),
            updated.camelot().unwrap_or("-")
        );

        updated
    }
}

impl Default for TrackAnalyzer {
    fn default() -> Self {
        Self::new(
            Arc::new(AubioBeatTracker::default()),
            Arc::new(PlaceholderKeyDetector::new()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MixmatchError, Result};
    use crate::types::Mode;

    struct FixedBeats(Vec<f64>);

    impl BeatTracker for FixedBeats {
        fn track_beats(&self, _path: &Path) -> Result<Vec<f64>> {
            Ok(self.0.clone())
        }
        fn is_available(&self) -> bool {
            true
        }
        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    struct Failing;

    impl BeatTracker for Failing {
        fn track_beats(&self, path: &Path) -> Result<Vec<f64>> {
            Err(MixmatchError::analysis_error(path, "decoder exploded"))
        }
        fn is_available(&self) -> bool {
            true
        }
        fn name(&self) -> &'static str {
            "failing"
        }
    }

    struct BrokenPipe;

    impl BeatTracker for BrokenPipe {
        fn track_beats(&self, _path: &Path) -> Result<Vec<f64>> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed").into())
        }
        fn is_available(&self) -> bool {
            true
        }
        fn name(&self) -> &'static str {
            "broken"
        }
    }

    struct FixedKey(u8);

    impl KeyDetector for FixedKey {
        fn detect(&self, _path: &Path) -> Result<Option<(u8, Mode)>> {
            Ok(Some((self.0, Mode::Minor)))
        }
        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    #[test]
    fn test_analyze_track_sets_bpm_and_timestamp() {
        let analyzer = TrackAnalyzer::new(
            Arc::new(FixedBeats(vec![0.5, 1.0, 1.5, 2.0])),
            Arc::new(PlaceholderKeyDetector::new()),
        );
        let track = Track::new("/music/a.mp3", None, None);
        let updated = analyzer.analyze_track(&track);

        assert_eq!(updated.bpm, Some(120.0));
        assert!(updated.last_analyzed.is_some());
        assert_eq!(updated.camelot(), None);
    }

    #[test]
    fn test_failure_keeps_previous_bpm() {
        let analyzer = TrackAnalyzer::new(Arc::new(Failing), Arc::new(PlaceholderKeyDetector::new()));
        let track = Track::new("/music/a.mp3", None, None).with_bpm(99.0);
        let updated = analyzer.analyze_track(&track);

        assert_eq!(updated.bpm, Some(99.0));
        assert!(updated.last_analyzed.is_some());
    }

    #[test]
    fn test_key_detector_populates_camelot() {
        let analyzer = TrackAnalyzer::new(Arc::new(FixedBeats(vec![])), Arc::new(FixedKey(2)));
        let updated = analyzer.analyze_track(&Track::new("/music/a.mp3", None, None));

        assert_eq!(updated.bpm, None);
        assert_eq!(updated.camelot(), Some("7A"));
    }

    #[test]
    fn test_out_of_range_detected_key_is_ignored() {
        let analyzer = TrackAnalyzer::new(Arc::new(FixedBeats(vec![])), Arc::new(FixedKey(14)));
        let track = Track::new("/music/a.mp3", None, None).with_key(9, Mode::Minor);
        let updated = analyzer.analyze_track(&track);

        assert_eq!(updated.key(), Some(9));
        assert_eq!(updated.camelot(), Some("8A"));
    }

    #[test]
    fn test_unrecoverable_tracker_error_keeps_previous_bpm() {
        let err: MixmatchError = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "x").into();
        assert!(!err.is_recoverable());

        let analyzer = TrackAnalyzer::new(Arc::new(BrokenPipe), Arc::new(PlaceholderKeyDetector::new()));
        assert_eq!(analyzer.analyze_bpm(Path::new("/music/a.mp3")), None);

        let updated = analyzer.analyze_track(&Track::new("/music/a.mp3", None, None).with_bpm(99.0));
        assert_eq!(updated.bpm, Some(99.0));
    }
}
