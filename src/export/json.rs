//! JSON persistence of the track list
//!
//! The library file is a plain JSON array of track records. Every analysis
//! field is nullable so freshly scanned tracks round-trip unchanged.

use crate::error::{MixmatchError, Result};
use crate::types::Track;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Write tracks to a JSON file
///
/// Uses atomic write pattern: writes to a temp file first, then renames.
/// This prevents data corruption if the write is interrupted.
pub fn save_tracks(tracks: &[Track], output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| MixmatchError::persistence_error(parent, e))?;
        }
    }

    // Write to temp file in same directory (ensures same filesystem for atomic rename)
    let temp_path = output_path.with_extension("json.tmp");

    let file = File::create(&temp_path).map_err(|e| MixmatchError::PersistenceError {
        path: output_path.to_path_buf(),
        reason: format!("Failed to create temp file: {}", e),
    })?;

    let mut writer = BufWriter::new(file);

    let written = serde_json::to_writer_pretty(&mut writer, tracks)
        .map_err(|e| e.to_string())
        .and_then(|_| writer.flush().map_err(|e| e.to_string()));

    if let Err(reason) = written {
        // Clean up temp file on error
        let _ = std::fs::remove_file(&temp_path);
        return Err(MixmatchError::PersistenceError {
            path: output_path.to_path_buf(),
            reason,
        });
    }
    drop(writer);

    // Atomic rename: either succeeds completely or fails without modifying target
    std::fs::rename(&temp_path, output_path).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        MixmatchError::PersistenceError {
            path: output_path.to_path_buf(),
            reason: format!("Failed to finalize file: {}", e),
        }
    })?;

    info!("Wrote {} tracks to {}", tracks.len(), output_path.display());

    Ok(())
}

/// Read tracks from a JSON file
///
/// Camelot codes are re-derived from key and mode on load. A missing or
/// corrupt file is an error; nothing is partially returned.
pub fn load_tracks(json_path: &Path) -> Result<Vec<Track>> {
    let file = File::open(json_path).map_err(|e| MixmatchError::persistence_error(json_path, e))?;

    let reader = BufReader::new(file);
    let mut tracks: Vec<Track> =
        serde_json::from_reader(reader).map_err(|e| MixmatchError::PersistenceError {
            path: json_path.to_path_buf(),
            reason: format!("Corrupt library file: {}", e),
        })?;

    for track in &mut tracks {
        if track.reconcile_camelot() {
            debug!("Re-derived camelot code for {}", track.path);
        }
    }

    debug!("Loaded {} tracks from {}", tracks.len(), json_path.display());

    Ok(tracks)
}
