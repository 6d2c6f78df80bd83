//! Core data types for mixmatch
//!
//! These types represent the domain model shared by the analysis,
//! matching and persistence layers.

use crate::analysis::key::camelot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

// =============================================================================
// Musical primitives
// =============================================================================

/// The 12 pitch classes in Western music
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PitchClass {
    C,
    Cs, // C#/Db
    D,
    Ds, // D#/Eb
    E,
    F,
    Fs, // F#/Gb
    G,
    Gs, // G#/Ab
    A,
    As, // A#/Bb
    B,
}

impl PitchClass {
    /// Convert from numeric index (0 = C, 1 = C#, ..., 11 = B)
    ///
    /// Returns `None` for indices outside 0-11.
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(PitchClass::C),
            1 => Some(PitchClass::Cs),
            2 => Some(PitchClass::D),
            3 => Some(PitchClass::Ds),
            4 => Some(PitchClass::E),
            5 => Some(PitchClass::F),
            6 => Some(PitchClass::Fs),
            7 => Some(PitchClass::G),
            8 => Some(PitchClass::Gs),
            9 => Some(PitchClass::A),
            10 => Some(PitchClass::As),
            11 => Some(PitchClass::B),
            _ => None,
        }
    }

}

/// Major or Minor scale
///
/// Persisted as an integer: 0 = minor, 1 = major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Mode {
    Minor,
    Major,
}

impl Mode {
    /// The other mode (relative major/minor)
    pub fn relative(self) -> Self {
        match self {
            Mode::Minor => Mode::Major,
            Mode::Major => Mode::Minor,
        }
    }
}

impl TryFrom<u8> for Mode {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(Mode::Minor),
            1 => Ok(Mode::Major),
            other => Err(format!("invalid mode {} (expected 0 = minor or 1 = major)", other)),
        }
    }
}

impl From<Mode> for u8 {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Minor => 0,
            Mode::Major => 1,
        }
    }
}

// =============================================================================
// Track representation
// =============================================================================

/// Analysis state of one audio file in the library
///
/// Created by the scanner with only path, title and artist. BPM and
/// `last_analyzed` are filled in by the tempo analysis; key, mode and
/// Camelot code by key detection. The Camelot code is always derived from
/// `(key, mode)` and can only change through [`Track::set_key`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// File path, unique within a library
    pub path: String,
    pub title: Option<String>,
    pub artist: Option<String>,
    /// Estimated tempo in beats per minute
    pub bpm: Option<f64>,
    /// Pitch class index 0-11 (C..B)
    key: Option<u8>,
    mode: Option<Mode>,
    camelot: Option<String>,
    /// Normalized energy in [0, 1]
    pub energy: Option<f64>,
    pub last_analyzed: Option<DateTime<Utc>>,
}

impl Track {
    /// Create a freshly scanned track with no analysis data
    pub fn new(path: impl Into<String>, title: Option<String>, artist: Option<String>) -> Self {
        Self {
            path: path.into(),
            title,
            artist,
            bpm: None,
            key: None,
            mode: None,
            camelot: None,
            energy: None,
            last_analyzed: None,
        }
    }

    /// Builder-style helper to set the BPM
    pub fn with_bpm(mut self, bpm: f64) -> Self {
        self.bpm = Some(bpm);
        self
    }

    /// Builder-style helper to set key and mode
    pub fn with_key(mut self, key: u8, mode: Mode) -> Self {
        self.set_key(key, mode);
        self
    }

    /// Set key and mode, deriving the Camelot code
    ///
    /// Keys outside 0-11 are ignored and leave the track unchanged; returns
    /// whether the key was applied.
    pub fn set_key(&mut self, key: u8, mode: Mode) -> bool {
        if PitchClass::from_index(key).is_none() {
            return false;
        }
        self.key = Some(key);
        self.mode = Some(mode);
        self.camelot = Some(camelot::to_camelot(key, mode).to_string());
        true
    }

    /// Forget key and mode (and with them the Camelot code)
    fn clear_key(&mut self) {
        self.key = None;
        self.mode = None;
        self.camelot = None;
    }

    pub fn key(&self) -> Option<u8> {
        self.key
    }

    pub fn mode(&self) -> Option<Mode> {
        self.mode
    }

    /// Camelot code ("1A" - "12B"), present only when key and mode are known
    pub fn camelot(&self) -> Option<&str> {
        self.camelot.as_deref()
    }

    /// Re-derive the Camelot code from key and mode
    ///
    /// Used after loading persisted data. An out-of-range key clears key,
    /// mode and code. Returns true if anything had to be changed.
    pub fn reconcile_camelot(&mut self) -> bool {
        if self.key.is_some_and(|key| PitchClass::from_index(key).is_none()) {
            self.clear_key();
            return true;
        }

        let derived = match (self.key, self.mode) {
            (Some(key), Some(mode)) => Some(camelot::to_camelot(key, mode).to_string()),
            _ => None,
        };
        if derived != self.camelot {
            self.camelot = derived;
            true
        } else {
            false
        }
    }

    /// Title for display, falling back to the file name
    pub fn display_title(&self) -> String {
        match self.title.as_deref() {
            Some(title) if !title.trim().is_empty() => title.to_string(),
            _ => Path::new(&self.path)
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| self.path.clone()),
        }
    }

    /// Whether a tempo estimate is available
    pub fn is_analyzed(&self) -> bool {
        self.bpm.is_some()
    }
}

// =============================================================================
// Match results
// =============================================================================

/// Tempo relationship between a candidate and the reference track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchType {
    /// Within tolerance of the reference BPM
    Direct,
    /// Near half the reference BPM
    HalfTime,
    /// Near double the reference BPM
    DoubleTime,
}

impl MatchType {
    /// Short label for display ("" for direct matches)
    pub fn label(self) -> &'static str {
        match self {
            MatchType::Direct => "",
            MatchType::HalfTime => "½×",
            MatchType::DoubleTime => "2×",
        }
    }
}

/// One ranked recommendation, created fresh for every query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchResult<'a> {
    pub track: &'a Track,
    /// Combined score in [0, 1]
    pub score: f64,
    pub match_type: MatchType,
}

// =============================================================================
// Supported formats
// =============================================================================

/// Audio formats picked up by the library scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    M4a,
    Flac,
    Wav,
    Aiff,
    Aac,
    Ogg,
}

impl AudioFormat {
    /// Detect format from file extension (case-insensitive)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "mp3" => Some(AudioFormat::Mp3),
            "m4a" => Some(AudioFormat::M4a),
            "flac" => Some(AudioFormat::Flac),
            "wav" => Some(AudioFormat::Wav),
            "aiff" => Some(AudioFormat::Aiff),
            "aac" => Some(AudioFormat::Aac),
            "ogg" => Some(AudioFormat::Ogg),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_class_index_round_trip() {
        for i in 0..12 {
            let pitch = PitchClass::from_index(i).unwrap();
            assert_eq!(pitch as u8, i);
        }
        assert_eq!(PitchClass::from_index(12), None);
    }

    #[test]
    fn test_set_key_derives_camelot() {
        let mut track = Track::new("/music/a.mp3", None, None);
        assert_eq!(track.camelot(), None);

        track.set_key(0, Mode::Major);
        assert_eq!(track.camelot(), Some("8B"));

        track.set_key(9, Mode::Minor);
        assert_eq!(track.camelot(), Some("8A"));

        assert!(!track.set_key(12, Mode::Major));
        assert_eq!(track.key(), Some(9));
        assert_eq!(track.camelot(), Some("8A"));
    }

    #[test]
    fn test_reconcile_camelot_fixes_stale_code() {
        let json = r#"{"path":"/a.mp3","key":2,"mode":0,"camelot":"3B"}"#;
        let mut track: Track = serde_json::from_str(json).unwrap();
        assert!(track.reconcile_camelot());
        assert_eq!(track.camelot(), Some("7A"));
        assert!(!track.reconcile_camelot());

        let json = r#"{"path":"/b.mp3","camelot":"3B"}"#;
        let mut track: Track = serde_json::from_str(json).unwrap();
        assert!(track.reconcile_camelot());
        assert_eq!(track.camelot(), None);
    }

    #[test]
    fn test_reconcile_camelot_clears_out_of_range_key() {
        let json = r#"{"path":"/c.mp3","key":15,"mode":1,"camelot":"1A"}"#;
        let mut track: Track = serde_json::from_str(json).unwrap();
        assert!(track.reconcile_camelot());
        assert_eq!(track.key(), None);
        assert_eq!(track.mode(), None);
        assert_eq!(track.camelot(), None);
    }

    #[test]
    fn test_track_json_field_names() {
        let mut track = Track::new("/a.mp3", Some("Song".into()), None).with_key(7, Mode::Major);
        track.last_analyzed = Some(Utc::now());
        let value = serde_json::to_value(&track).unwrap();

        assert_eq!(value["path"], "/a.mp3");
        assert_eq!(value["mode"], 1);
        assert_eq!(value["camelot"], "9B");
        assert!(value.get("lastAnalyzed").is_some());
        assert!(value["bpm"].is_null());
        assert!(value["artist"].is_null());
    }

    #[test]
    fn test_invalid_mode_rejected() {
        let json = r#"{"path":"/a.mp3","mode":2}"#;
        assert!(serde_json::from_str::<Track>(json).is_err());
    }

    #[test]
    fn test_display_title_falls_back_to_file_stem() {
        let track = Track::new("/music/Artist - Tune.flac", None, None);
        assert_eq!(track.display_title(), "Artist - Tune");

        let track = Track::new("/music/x.flac", Some("  ".into()), None);
        assert_eq!(track.display_title(), "x");
    }

    #[test]
    fn test_audio_format_extensions() {
        assert_eq!(AudioFormat::from_extension("MP3"), Some(AudioFormat::Mp3));
        assert_eq!(AudioFormat::from_extension("ogg"), Some(AudioFormat::Ogg));
        assert_eq!(AudioFormat::from_extension("aif"), None);
    }
}
