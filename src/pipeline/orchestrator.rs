//! Pipeline orchestration
//!
//! Scan and analysis are sequential loops: each item is finished before the
//! next starts, a progress event is emitted after every item, and the
//! cancel token is checked between items.

use crate::analysis::TrackAnalyzer;
use crate::discovery::{self, DiscoveredFile};
use crate::error::Result;
use crate::types::Track;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Shared flag a caller sets to stop a running scan or analysis
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Emitted after each processed item
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    /// Items finished so far (1-based)
    pub completed: usize,
    pub total: usize,
    /// The record produced for this item
    pub track: Track,
}

/// Result of a scan pass
#[derive(Debug)]
pub struct ScanOutcome {
    pub tracks: Vec<Track>,
    /// Files found before any were read
    pub total_files: usize,
    pub cancelled: bool,
}

/// Result of an analysis pass
#[derive(Debug)]
pub struct AnalysisOutcome {
    /// Every input track in input order; unprocessed ones unchanged
    pub tracks: Vec<Track>,
    /// Tracks processed before completion or cancellation
    pub processed: usize,
    /// Processed tracks that ended up with a BPM
    pub with_bpm: usize,
    pub cancelled: bool,
}

/// Scan a directory into fresh track records
pub fn scan_library<F>(root: &Path, cancel: &CancelToken, mut on_progress: F) -> Result<ScanOutcome>
where
    F: FnMut(ProgressEvent),
{
    let start = Instant::now();
    info!("Scanning {} for audio files...", root.display());
    let files: Vec<DiscoveredFile> = discovery::discover(root)?;
    let total = files.len();

    let mut tracks = Vec::with_capacity(total);
    let mut cancelled = false;

    for (index, file) in files.iter().enumerate() {
        if cancel.is_cancelled() {
            info!("Scan cancelled after {} of {} files", index, total);
            cancelled = true;
            break;
        }

        let track = discovery::read_track(file);
        tracks.push(track.clone());
        on_progress(ProgressEvent {
            completed: index + 1,
            total,
            track,
        });
    }

    info!(
        "Scanned {} tracks in {:.2}s",
        tracks.len(),
        start.elapsed().as_secs_f64()
    );

    Ok(ScanOutcome {
        tracks,
        total_files: total,
        cancelled,
    })
}

/// Analyze tracks one at a time in input order
///
/// A track whose estimation fails keeps its previous BPM; only
/// `last_analyzed` changes. When the beat tracker is not installed a single
/// warning is logged and every track is still visited.
pub fn analyze_library<F>(
    tracks: Vec<Track>,
    analyzer: &TrackAnalyzer,
    cancel: &CancelToken,
    mut on_progress: F,
) -> AnalysisOutcome
where
    F: FnMut(ProgressEvent),
{
    let start = Instant::now();
    let total = tracks.len();

    if !analyzer.is_available() {
        warn!(
            "{} is not installed; BPM analysis is unavailable for this run",
            analyzer.beat_tracker_name()
        );
    }

    let mut processed = 0;
    let mut with_bpm = 0;
    let mut cancelled = false;
    let mut updated = Vec::with_capacity(total);
    let mut remaining = tracks.into_iter();

    for track in remaining.by_ref() {
        if cancel.is_cancelled() {
            info!("Analysis cancelled after {} of {} tracks", processed, total);
            cancelled = true;
            updated.push(track);
            break;
        }

        let analyzed = analyzer.analyze_track(&track);
        processed += 1;
        if analyzed.bpm.is_some() {
            with_bpm += 1;
        }

        on_progress(ProgressEvent {
            completed: processed,
            total,
            track: analyzed.clone(),
        });
        updated.push(analyzed);
    }

    // Untouched tail after cancellation
    updated.extend(remaining);

    let elapsed = start.elapsed().as_secs_f64();
    debug!("Analyzed {} tracks in {:.2}s", processed, elapsed);
    info!(
        "Analysis finished: {}/{} tracks have a BPM",
        with_bpm, processed
    );

    AnalysisOutcome {
        tracks: updated,
        processed,
        with_bpm,
        cancelled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{BeatTracker, PlaceholderKeyDetector};
    use crate::error::Result;
    use std::sync::Arc;

    /// Beats at 120 BPM for every file except ones named "broken"
    struct Steady;

    impl BeatTracker for Steady {
        fn track_beats(&self, path: &Path) -> Result<Vec<f64>> {
            if path.to_string_lossy().contains("broken") {
                Ok(vec![])
            } else {
                Ok(vec![0.5, 1.0, 1.5, 2.0])
            }
        }
        fn is_available(&self) -> bool {
            true
        }
        fn name(&self) -> &'static str {
            "steady"
        }
    }

    fn analyzer() -> TrackAnalyzer {
        TrackAnalyzer::new(Arc::new(Steady), Arc::new(PlaceholderKeyDetector::new()))
    }

    fn library() -> Vec<Track> {
        vec![
            Track::new("/m/one.mp3", None, None),
            Track::new("/m/broken.mp3", None, None).with_bpm(90.0),
            Track::new("/m/three.mp3", None, None),
        ]
    }

    #[test]
    fn test_analyze_reports_progress_in_order() {
        let mut events = Vec::new();
        let outcome = analyze_library(library(), &analyzer(), &CancelToken::new(), |e| {
            events.push(e)
        });

        assert_eq!(outcome.processed, 3);
        assert_eq!(outcome.with_bpm, 3);
        assert!(!outcome.cancelled);

        let progress: Vec<_> = events.iter().map(|e| (e.completed, e.total)).collect();
        assert_eq!(progress, vec![(1, 3), (2, 3), (3, 3)]);
        assert_eq!(events[0].track.path, "/m/one.mp3");
        assert_eq!(events[2].track.path, "/m/three.mp3");

        assert_eq!(outcome.tracks[0].bpm, Some(120.0));
        // Failed estimation keeps the previous value
        assert_eq!(outcome.tracks[1].bpm, Some(90.0));
        assert!(outcome.tracks.iter().all(|t| t.last_analyzed.is_some()));
    }

    #[test]
    fn test_cancel_between_items() {
        let cancel = CancelToken::new();
        let mut seen = 0;
        let outcome = analyze_library(library(), &analyzer(), &cancel.clone(), |_| {
            seen += 1;
            cancel.cancel();
        });

        assert!(outcome.cancelled);
        assert_eq!(outcome.processed, 1);
        assert_eq!(seen, 1);
        assert_eq!(outcome.tracks.len(), 3);
        assert_eq!(outcome.tracks[0].bpm, Some(120.0));
        assert_eq!(outcome.tracks[1].last_analyzed, None);
        assert_eq!(outcome.tracks[2].path, "/m/three.mp3");
        assert_eq!(outcome.tracks[2].last_analyzed, None);
    }

    #[test]
    fn test_cancel_token_is_shared_between_clones() {
        let token = CancelToken::new();
        let shared = token.clone();
        assert!(!token.is_cancelled());
        shared.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_scan_library_emits_events() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.mp3"), b"").unwrap();
        std::fs::write(dir.path().join("b.wav"), b"").unwrap();

        let mut events = Vec::new();
        let outcome = scan_library(dir.path(), &CancelToken::new(), |e| events.push(e)).unwrap();

        assert_eq!(outcome.total_files, 2);
        assert_eq!(outcome.tracks.len(), 2);
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].completed, 2);
        assert_eq!(events[1].track.title.as_deref(), Some("b"));
    }
}
