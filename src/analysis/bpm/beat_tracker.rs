//! External beat tracker (aubiotrack)
//!
//! Runs `aubiotrack -i <file>` and reads one beat timestamp per line from
//! its standard output. The binary is located once at construction; every
//! invocation is bounded by a timeout after which the child is killed.

use super::parse_beat_output;
use crate::analysis::traits::BeatTracker;
use crate::error::{MixmatchError, Result};
use crossbeam_channel::{bounded, RecvTimeoutError};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Name of the beat tracking binary
pub const ANALYZER_BINARY: &str = "aubiotrack";

/// Environment variable overriding the binary location
pub const ANALYZER_ENV: &str = "MIXMATCH_ANALYZER";

/// Default per-file time limit
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// How often to check for exit once the output is complete
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Well-known install locations, checked before `PATH`
const KNOWN_LOCATIONS: &[&str] = &[
    "/opt/homebrew/bin/aubiotrack", // Homebrew, Apple Silicon
    "/usr/local/bin/aubiotrack",    // Homebrew, Intel
    "/usr/bin/aubiotrack",          // Linux distributions
];

/// Find the beat tracker binary
///
/// Search order:
/// 1. Explicit path (settings or command line)
/// 2. MIXMATCH_ANALYZER environment variable
/// 3. Well-known install locations
/// 4. Each directory on PATH
///
/// Returns the first existing file, or an error listing all checked locations.
pub fn find_analyzer(explicit: Option<&Path>) -> Result<PathBuf> {
    let mut checked_locations: Vec<String> = Vec::new();

    // 1. Explicit path
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        checked_locations.push(path.display().to_string());
    }

    // 2. Environment variable
    if let Some(env_path) = std::env::var_os(ANALYZER_ENV).map(PathBuf::from) {
        if env_path.is_file() {
            return Ok(env_path);
        }
        checked_locations.push(format!("{}={}", ANALYZER_ENV, env_path.display()));
    }

    // 3. Well-known locations
    for location in KNOWN_LOCATIONS {
        let path = PathBuf::from(location);
        if path.is_file() {
            return Ok(path);
        }
        checked_locations.push(location.to_string());
    }

    // 4. PATH
    if let Some(path_var) = std::env::var_os("PATH") {
        for dir in std::env::split_paths(&path_var) {
            let candidate = dir.join(ANALYZER_BINARY);
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
        checked_locations.push("$PATH".to_string());
    }

    let locations_list = checked_locations
        .iter()
        .map(|loc| format!("  - {}", loc))
        .collect::<Vec<_>>()
        .join("\n");

    Err(MixmatchError::AnalyzerUnavailable {
        reason: format!("{} not found.\n\n  Locations checked:\n{}", ANALYZER_BINARY, locations_list),
    })
}

/// Beat tracker backed by the aubiotrack command-line tool
#[derive(Debug, Clone)]
pub struct AubioBeatTracker {
    binary: Option<PathBuf>,
    timeout: Duration,
}

impl AubioBeatTracker {
    /// Locate the binary (see [`find_analyzer`]) and use the given timeout
    ///
    /// A missing binary is not an error here; the tracker reports itself as
    /// unavailable instead.
    pub fn new(explicit: Option<&Path>, timeout: Duration) -> Self {
        let binary = match find_analyzer(explicit) {
            Ok(path) => {
                debug!("Using beat tracker at {}", path.display());
                Some(path)
            }
            Err(e) => {
                debug!("{}", e);
                None
            }
        };
        Self { binary, timeout }
    }

    /// Use a specific binary without searching
    pub fn with_binary(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: Some(binary.into()),
            timeout,
        }
    }

    fn kill_on_timeout(&self, child: &mut Child, path: &Path) -> MixmatchError {
        warn!(
            "Beat tracker exceeded {}s on {}, killing it",
            self.timeout.as_secs(),
            path.display()
        );
        let _ = child.kill();
        let _ = child.wait();
        MixmatchError::AnalyzerTimeout {
            path: path.to_path_buf(),
            seconds: self.timeout.as_secs(),
        }
    }
}

impl Default for AubioBeatTracker {
    fn default() -> Self {
        Self::new(None, DEFAULT_TIMEOUT)
    }
}

impl BeatTracker for AubioBeatTracker {
    fn track_beats(&self, path: &Path) -> Result<Vec<f64>> {
        let binary = self.binary.as_ref().ok_or_else(|| MixmatchError::AnalyzerUnavailable {
            reason: format!("{} not found", ANALYZER_BINARY),
        })?;

        if !path.exists() {
            return Err(MixmatchError::FileNotFound(path.to_path_buf()));
        }

        let mut child = Command::new(binary)
            .arg("-i")
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                MixmatchError::analysis_error(path, format!("Failed to start {}: {}", binary.display(), e))
            })?;

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| MixmatchError::analysis_error(path, "Beat tracker stdout unavailable"))?;

        // Reader thread delivers the full output once the pipe closes
        let (tx, rx) = bounded::<std::io::Result<String>>(1);
        let reader = thread::spawn(move || {
            let mut output = String::new();
            let result = stdout.read_to_string(&mut output).map(|_| output);
            let _ = tx.send(result);
        });

        let deadline = Instant::now() + self.timeout;

        let output = match rx.recv_deadline(deadline) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                // Grandchildren may still hold the pipe; leave the reader detached
                drop(reader);
                return Err(self.kill_on_timeout(&mut child, path));
            }
            Err(RecvTimeoutError::Disconnected) => Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "reader thread exited without output",
            )),
        };
        let _ = reader.join();

        // Closing stdout does not mean the process has exited
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                return Err(self.kill_on_timeout(&mut child, path));
            }
            thread::sleep(EXIT_POLL_INTERVAL);
        };

        let output = output.map_err(|e| {
            MixmatchError::analysis_error(path, format!("Failed to read beat tracker output: {}", e))
        })?;

        if !status.success() {
            return Err(MixmatchError::analysis_error(
                path,
                format!("{} exited with {}", ANALYZER_BINARY, status),
            ));
        }

        let beats = parse_beat_output(&output);
        debug!("{} beats detected in {}", beats.len(), path.display());
        Ok(beats)
    }

    fn is_available(&self) -> bool {
        self.binary.is_some()
    }

    fn name(&self) -> &'static str {
        ANALYZER_BINARY
    }
}
