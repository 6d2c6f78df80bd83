//! File discovery and scanning

use crate::analysis::metadata;
use crate::error::{MixmatchError, Result};
use crate::types::{AudioFormat, Track};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Directory extensions treated as opaque packages (never descended into)
const PACKAGE_EXTENSIONS: &[&str] = &[
    "app",
    "bundle",
    "framework",
    "plugin",
    "component",
    "vst",
    "vst3",
    "logicx",
    "band",
    "photoslibrary",
    "musiclibrary",
    "tvlibrary",
];

/// Discovered audio file
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub format: AudioFormat,
}

/// Find audio files under a path (file or directory)
///
/// Directories are walked recursively in sorted order, skipping hidden
/// entries and package directories.
pub fn discover(input: &Path) -> Result<Vec<DiscoveredFile>> {
    if !input.exists() {
        return Err(MixmatchError::FileNotFound(input.to_path_buf()));
    }

    let mut files = Vec::new();

    if input.is_file() {
        // Single file mode
        if let Some(file) = try_discover_file(input) {
            files.push(file);
        } else {
            return Err(MixmatchError::UnsupportedFormat {
                path: input.to_path_buf(),
                format: input
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("unknown")
                    .to_string(),
            });
        }
    } else {
        let walker = WalkDir::new(input)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !(is_hidden(e) || is_package(e)));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if entry.file_type().is_file() {
                if let Some(file) = try_discover_file(entry.path()) {
                    debug!("Discovered: {} ({:?})", file.path.display(), file.format);
                    files.push(file);
                }
            }
        }
    }

    info!("Discovered {} audio files", files.len());

    if files.is_empty() {
        warn!("No supported audio files found in {}", input.display());
    }

    Ok(files)
}

/// Build a fresh track record for a discovered file
///
/// Tag read failures fall back to the file name as title.
pub fn read_track(file: &DiscoveredFile) -> Track {
    let tags = metadata::extract_tags(&file.path);
    Track::new(file.path.to_string_lossy().to_string(), tags.title, tags.artist)
}

/// Scan a path and build track records in one go
pub fn scan(input: &Path) -> Result<Vec<Track>> {
    Ok(discover(input)?.iter().map(read_track).collect())
}

/// Try to create a DiscoveredFile if the path is a supported audio format
fn try_discover_file(path: &Path) -> Option<DiscoveredFile> {
    let ext = path.extension()?.to_str()?;
    let format = AudioFormat::from_extension(ext)?;

    Some(DiscoveredFile {
        path: path.to_path_buf(),
        format,
    })
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn is_package(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                PACKAGE_EXTENSIONS.contains(&ext.as_str())
            })
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_discover_filters_extensions() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("a.mp3"));
        touch(&dir.path().join("b.FLAC"));
        touch(&dir.path().join("notes.txt"));
        touch(&dir.path().join("sub/c.m4a"));

        let files = discover(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.mp3", "b.FLAC", "c.m4a"]);
        assert_eq!(files[1].format, AudioFormat::Flac);
    }

    #[test]
    fn test_discover_skips_hidden_and_packages() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join(".hidden.mp3"));
        touch(&dir.path().join(".cache/d.mp3"));
        touch(&dir.path().join("Song.band/Media/e.wav"));
        touch(&dir.path().join("keep.ogg"));

        let files = discover(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].path.ends_with("keep.ogg"));
    }

    #[test]
    fn test_discover_missing_path() {
        let err = discover(Path::new("/no/such/library")).unwrap_err();
        assert!(matches!(err, MixmatchError::FileNotFound(_)));
    }

    #[test]
    fn test_discover_single_unsupported_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cover.jpg");
        touch(&path);
        let err = discover(&path).unwrap_err();
        assert!(matches!(err, MixmatchError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_scan_builds_unanalyzed_tracks() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("Deep Cut.wav"));

        let tracks = scan(dir.path()).unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].title.as_deref(), Some("Deep Cut"));
        assert_eq!(tracks[0].bpm, None);
        assert_eq!(tracks[0].camelot(), None);
        assert_eq!(tracks[0].last_analyzed, None);
    }
}
