//! Metadata extraction from audio file tags
//!
//! Uses lofty to read ID3v2 (MP3), MP4 atoms (M4A/AAC), Vorbis comments
//! (FLAC/OGG) and AIFF/WAV tags.

use crate::error::MixmatchError;
use lofty::{Accessor, Probe, TaggedFileExt};
use std::path::Path;
use tracing::{debug, warn};

/// Title and artist read from a file's tags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackTags {
    pub title: Option<String>,
    pub artist: Option<String>,
}

/// Extract title and artist from an audio file's tags
///
/// On error (corrupt tags, unreadable file) logs a warning and returns
/// empty tags. A missing or blank title falls back to the file name.
pub fn extract_tags(path: &Path) -> TrackTags {
    let mut tags = match extract_tags_inner(path) {
        Ok(tags) => tags,
        Err(e) => {
            warn!("{}", e);
            TrackTags::default()
        }
    };

    if tags.title.is_none() {
        tags.title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.to_string());
    }

    tags
}

fn extract_tags_inner(path: &Path) -> Result<TrackTags, MixmatchError> {
    let to_error = |e: lofty::error::LoftyError| MixmatchError::MetadataError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let tagged_file = Probe::open(path).map_err(to_error)?.read().map_err(to_error)?;
    let tag = tagged_file.primary_tag().or_else(|| tagged_file.first_tag());

    let tags = match tag {
        Some(tag) => TrackTags {
            title: non_blank(tag.title().map(|s| s.to_string())),
            artist: non_blank(tag.artist().map(|s| s.to_string())),
        },
        None => {
            debug!("No tags found in {}", path.display());
            TrackTags::default()
        }
    };

    Ok(tags)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreadable_file_falls_back_to_filename() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("Night Drive.mp3");
        std::fs::write(&path, b"not really audio").unwrap();

        let tags = extract_tags(&path);
        assert_eq!(tags.title.as_deref(), Some("Night Drive"));
        assert_eq!(tags.artist, None);
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(Some(" X ".into())), Some("X".into()));
        assert_eq!(non_blank(None), None);
    }
}
