//! CLI argument parsing

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// mixmatch - Harmonic mixing assistant for DJs
///
/// Scans a music library, estimates each track's BPM with aubiotrack and
/// recommends tracks that mix well with a chosen one, by tempo and
/// Camelot key.
#[derive(Parser, Debug)]
#[command(name = "mixmatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Library file (defaults to the per-user data directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub library: Option<PathBuf>,

    /// Settings file (overrides MIXMATCH_CONFIG_PATH)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only, no progress bars)
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan a folder for audio files and replace the library with its contents
    Scan {
        /// Folder to scan (defaults to the configured library root)
        #[arg(value_name = "DIR")]
        dir: Option<PathBuf>,
    },

    /// Estimate BPM for tracks that have none yet
    Analyze(AnalyzeArgs),

    /// Recommend tracks that mix well with the given one
    Match(MatchArgs),

    /// Show Camelot codes compatible with a key
    Keys {
        /// Camelot code, e.g. 8A
        #[arg(value_name = "CODE")]
        code: String,
    },

    /// List the library
    List,

    /// Show or change persisted settings
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Re-analyze tracks that already have a BPM
    #[arg(long, default_value = "false")]
    pub force: bool,

    /// Per-file time limit for the beat tracker, in seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Path to the aubiotrack binary
    #[arg(long, value_name = "PATH")]
    pub analyzer: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct MatchArgs {
    /// Reference track: exact path or part of its title
    #[arg(value_name = "TRACK")]
    pub track: String,

    /// BPM tolerance (defaults to the configured tolerance)
    #[arg(short, long, value_name = "BPM", conflicts_with = "tolerance_percent")]
    pub tolerance: Option<f64>,

    /// BPM tolerance as a percentage of the reference tempo
    #[arg(long, value_name = "PCT")]
    pub tolerance_percent: Option<f64>,

    /// Maximum number of recommendations
    #[arg(short = 'n', long, default_value_t = crate::matching::DEFAULT_LIMIT)]
    pub limit: usize,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Set the music folder scanned by default
    #[arg(long, value_name = "DIR")]
    pub library_root: Option<PathBuf>,

    /// Set the default BPM tolerance (1-10)
    #[arg(long, value_name = "BPM")]
    pub tolerance: Option<f64>,

    /// Set the aubiotrack binary location
    #[arg(long, value_name = "PATH")]
    pub analyzer: Option<PathBuf>,

    /// Set the per-file beat tracker time limit in seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,
}

impl Cli {
    /// Get the log level based on verbosity flags
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            return tracing::Level::ERROR;
        }
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
