//! Owned library state
//!
//! `LibraryStore` is the single owner of the track collection. Scans and
//! analyses run through it, one at a time; every change is applied here and
//! broadcast as a [`LibraryEvent`] to subscribers, which only ever see
//! immutable copies.

use super::orchestrator::{analyze_library, scan_library, CancelToken, ProgressEvent};
use crate::analysis::TrackAnalyzer;
use crate::error::{MixmatchError, Result};
use crate::export;
use crate::types::Track;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

/// Which long-running job produced an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Scan,
    Analyze,
}

/// Change notification sent to subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum LibraryEvent {
    Started { job: JobKind },
    Progress { job: JobKind, progress: ProgressEvent },
    Finished { job: JobKind, cancelled: bool },
    /// The whole collection was replaced (load or completed scan)
    Replaced { count: usize },
}

/// Summary of a finished job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobSummary {
    pub processed: usize,
    pub total: usize,
    pub cancelled: bool,
}

/// Thread-safe owner of the track collection
#[derive(Debug, Default)]
pub struct LibraryStore {
    tracks: Mutex<Vec<Track>>,
    subscribers: Mutex<Vec<Sender<LibraryEvent>>>,
    busy: AtomicBool,
}

/// Clears the busy flag when a job ends, including on early return
struct JobGuard<'a>(&'a AtomicBool);

impl Drop for JobGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl LibraryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tracks(tracks: Vec<Track>) -> Self {
        Self {
            tracks: Mutex::new(tracks),
            ..Self::default()
        }
    }

    /// Receive every future event
    pub fn subscribe(&self) -> Receiver<LibraryEvent> {
        let (tx, rx) = unbounded();
        lock(&self.subscribers).push(tx);
        rx
    }

    /// Copy of the current collection
    pub fn snapshot(&self) -> Vec<Track> {
        lock(&self.tracks).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.tracks).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.tracks).is_empty()
    }

    /// Number of tracks with a BPM estimate
    pub fn analyzed_count(&self) -> usize {
        lock(&self.tracks).iter().filter(|t| t.is_analyzed()).count()
    }

    /// Look up a track by path
    pub fn get(&self, path: &str) -> Option<Track> {
        lock(&self.tracks).iter().find(|t| t.path == path).cloned()
    }

    /// Whether a scan or analysis is running
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    fn begin_job(&self) -> Result<JobGuard<'_>> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(MixmatchError::Busy);
        }
        Ok(JobGuard(&self.busy))
    }

    fn emit(&self, event: LibraryEvent) {
        // Drop subscribers whose receiver is gone
        lock(&self.subscribers).retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Replace the collection with the tracks found under `root`
    ///
    /// The collection is only replaced when the scan runs to completion.
    pub fn scan(&self, root: &Path, cancel: &CancelToken) -> Result<JobSummary> {
        let _guard = self.begin_job()?;
        self.emit(LibraryEvent::Started { job: JobKind::Scan });

        let outcome = match scan_library(root, cancel, |progress| {
            self.emit(LibraryEvent::Progress {
                job: JobKind::Scan,
                progress,
            })
        }) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.emit(LibraryEvent::Finished {
                    job: JobKind::Scan,
                    cancelled: false,
                });
                return Err(e);
            }
        };

        let processed = outcome.tracks.len();
        if !outcome.cancelled {
            *lock(&self.tracks) = outcome.tracks;
            self.emit(LibraryEvent::Replaced { count: processed });
        }

        self.emit(LibraryEvent::Finished {
            job: JobKind::Scan,
            cancelled: outcome.cancelled,
        });

        Ok(JobSummary {
            processed,
            total: outcome.total_files,
            cancelled: outcome.cancelled,
        })
    }

    /// Analyze tracks, updating each one in place as soon as it is done
    ///
    /// With `force` every track is analyzed; otherwise only tracks without a
    /// BPM.
    pub fn analyze(&self, analyzer: &TrackAnalyzer, cancel: &CancelToken, force: bool) -> Result<JobSummary> {
        let _guard = self.begin_job()?;
        self.emit(LibraryEvent::Started {
            job: JobKind::Analyze,
        });

        let pending: Vec<Track> = lock(&self.tracks)
            .iter()
            .filter(|t| force || !t.is_analyzed())
            .cloned()
            .collect();
        let total = pending.len();
        debug!("{} tracks queued for analysis", total);

        let outcome = analyze_library(pending, analyzer, cancel, |progress| {
            self.apply(&progress.track);
            self.emit(LibraryEvent::Progress {
                job: JobKind::Analyze,
                progress,
            });
        });

        self.emit(LibraryEvent::Finished {
            job: JobKind::Analyze,
            cancelled: outcome.cancelled,
        });

        Ok(JobSummary {
            processed: outcome.processed,
            total,
            cancelled: outcome.cancelled,
        })
    }

    /// Replace the stored record with the same path
    fn apply(&self, updated: &Track) {
        let mut tracks = lock(&self.tracks);
        if let Some(slot) = tracks.iter_mut().find(|t| t.path == updated.path) {
            *slot = updated.clone();
        }
    }

    /// Load the collection from a JSON file
    ///
    /// On failure the current collection is left unchanged. Refused while a
    /// scan or analysis is running.
    pub fn load(&self, path: &Path) -> Result<usize> {
        let _guard = self.begin_job()?;
        let tracks = export::load_tracks(path)?;
        let count = tracks.len();
        *lock(&self.tracks) = tracks;
        info!("Loaded {} tracks from {}", count, path.display());
        self.emit(LibraryEvent::Replaced { count });
        Ok(count)
    }

    /// Save the collection to a JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let tracks = self.snapshot();
        export::save_tracks(&tracks, path)
    }
}

/// Lock a mutex, recovering the data if a holder panicked
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
