//! mixmatch CLI entry point

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use mixmatch::analysis::key::camelot;
use mixmatch::analysis::{AubioBeatTracker, PlaceholderKeyDetector, TrackAnalyzer};
use mixmatch::config::cli::{AnalyzeArgs, Command, ConfigArgs, MatchArgs};
use mixmatch::config::{resolve_config_path, resolve_library_path, Cli, Settings};
use mixmatch::matching::{find_matches_for, BpmTolerance, MatchOptions};
use mixmatch::pipeline::{CancelToken, JobSummary, LibraryEvent, LibraryStore};
use mixmatch::{MixmatchError, Result, Track};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(&cli);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let filter = cli.log_level().to_string().to_lowercase();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let config_path = resolve_config_path(cli.config.as_deref())?;
    let settings = Settings::load(&config_path)?;
    let library_path = resolve_library_path(cli.library.as_deref())?;

    match &cli.command {
        Command::Scan { dir } => scan(cli, &settings, dir.as_deref(), &library_path),
        Command::Analyze(args) => analyze(cli, &settings, args, &library_path),
        Command::Match(args) => show_matches(&settings, args, &library_path),
        Command::Keys { code } => show_keys(code),
        Command::List => list(&library_path),
        Command::Config(args) => configure(settings, args, &config_path),
    }
}

fn scan(cli: &Cli, settings: &Settings, dir: Option<&Path>, library_path: &Path) -> Result<ExitCode> {
    let Some(root) = dir.or(settings.library_root.as_deref()) else {
        return Err(MixmatchError::ConfigError(
            "No folder given and no library root configured\n  Tip: mixmatch scan ~/Music or mixmatch config --library-root ~/Music".to_string(),
        ));
    };
    if !root.exists() {
        return Err(MixmatchError::FileNotFound(root.to_path_buf()));
    }

    let store = LibraryStore::new();
    let summary = with_progress(&store, cli.quiet, "Scanning", |store| {
        store.scan(root, &CancelToken::new())
    })?;

    store.save(library_path)?;
    println!(
        "Scanned {} tracks from {} (saved to {})",
        summary.processed,
        root.display(),
        library_path.display()
    );
    Ok(ExitCode::SUCCESS)
}

fn analyze(cli: &Cli, settings: &Settings, args: &AnalyzeArgs, library_path: &Path) -> Result<ExitCode> {
    let store = LibraryStore::new();
    store.load(library_path)?;

    let explicit = args.analyzer.as_deref().or(settings.analyzer_path.as_deref());
    let timeout = args
        .timeout
        .map(std::time::Duration::from_secs)
        .unwrap_or_else(|| settings.analyzer_timeout());
    let analyzer = TrackAnalyzer::new(
        Arc::new(AubioBeatTracker::new(explicit, timeout)),
        Arc::new(PlaceholderKeyDetector::new()),
    );

    if !analyzer.is_available() {
        // Surface the lookup failure with install tips; tracks are left untouched
        if let Err(e) = mixmatch::analysis::bpm::beat_tracker::find_analyzer(explicit) {
            eprintln!("Error: {}", e);
        }
        return Ok(ExitCode::FAILURE);
    }

    let summary = with_progress(&store, cli.quiet, "Analyzing", |store| {
        store.analyze(&analyzer, &CancelToken::new(), args.force)
    })?;

    store.save(library_path)?;
    println!(
        "Analyzed {} of {} tracks ({} of {} in library have a BPM)",
        summary.processed,
        summary.total,
        store.analyzed_count(),
        store.len()
    );
    Ok(ExitCode::SUCCESS)
}

/// Run a store job while a background thread renders its progress events
fn with_progress<F>(store: &LibraryStore, quiet: bool, label: &'static str, job: F) -> Result<JobSummary>
where
    F: FnOnce(&LibraryStore) -> Result<JobSummary>,
{
    if quiet {
        return job(store);
    }

    let events = store.subscribe();
    let renderer = thread::spawn(move || {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(label);

        for event in events {
            match event {
                LibraryEvent::Progress { progress, .. } => {
                    pb.set_length(progress.total as u64);
                    pb.set_position(progress.completed as u64);
                    pb.set_message(progress.track.display_title());
                }
                LibraryEvent::Finished { .. } => break,
                _ => {}
            }
        }
        pb.finish_and_clear();
    });

    let result = job(store);
    // Busy errors never emit Finished, so the renderer is detached rather than joined
    if !matches!(result, Err(MixmatchError::Busy)) {
        let _ = renderer.join();
    }
    result
}

fn show_matches(settings: &Settings, args: &MatchArgs, library_path: &Path) -> Result<ExitCode> {
    let store = LibraryStore::new();
    store.load(library_path)?;
    let tracks = store.snapshot();

    let Some(reference) = find_reference(&tracks, &args.track) else {
        eprintln!("No track matching '{}' in the library", args.track);
        return Ok(ExitCode::FAILURE);
    };
    if reference.bpm.is_none() {
        eprintln!(
            "'{}' has no BPM yet\n  Tip: Run `mixmatch analyze` first",
            reference.display_title()
        );
        return Ok(ExitCode::FAILURE);
    }

    let tolerance = match (args.tolerance_percent, args.tolerance) {
        (Some(pct), _) => BpmTolerance::Percent(pct),
        (None, Some(bpm)) => BpmTolerance::Absolute(bpm),
        (None, None) => BpmTolerance::Absolute(settings.bpm_tolerance),
    };
    let options = MatchOptions {
        tolerance,
        limit: args.limit,
    };
    info!("Matching against '{}' with {:?}", reference.path, options);

    println!("{}", describe(reference));
    let matches = find_matches_for(reference, &tracks, &options);
    if matches.is_empty() {
        println!("  No compatible tracks found");
    }
    for m in matches {
        println!(
            "  {:>4.0}%  {:<3} {}",
            m.score * 100.0,
            m.match_type.label(),
            describe(m.track)
        );
    }
    Ok(ExitCode::SUCCESS)
}

/// Exact path first, then the first case-insensitive title match
fn find_reference<'a>(tracks: &'a [Track], query: &str) -> Option<&'a Track> {
    tracks.iter().find(|t| t.path == query).or_else(|| {
        let needle = query.to_lowercase();
        tracks
            .iter()
            .find(|t| t.display_title().to_lowercase().contains(&needle))
    })
}

fn describe(track: &Track) -> String {
    let bpm = track
        .bpm
        .map(|b| format!("{:.1}", b))
        .unwrap_or_else(|| "--".to_string());
    let artist = track.artist.as_deref().unwrap_or("Unknown artist");
    format!(
        "{:>6} BPM  {:<3}  {} - {}",
        bpm,
        track.camelot().unwrap_or("--"),
        artist,
        track.display_title()
    )
}

fn show_keys(code: &str) -> Result<ExitCode> {
    let keys = camelot::compatible_keys(code);
    if keys.is_empty() {
        eprintln!("'{}' is not a Camelot code (expected 1A-12B)", code);
        return Ok(ExitCode::FAILURE);
    }
    for key in keys {
        println!("{:<3}  {:.2}", key, camelot::compatibility(code, key));
    }
    Ok(ExitCode::SUCCESS)
}

fn list(library_path: &Path) -> Result<ExitCode> {
    let store = LibraryStore::new();
    store.load(library_path)?;
    for track in store.snapshot() {
        println!("{}", describe(&track));
    }
    println!("{} tracks, {} analyzed", store.len(), store.analyzed_count());
    Ok(ExitCode::SUCCESS)
}

fn configure(mut settings: Settings, args: &ConfigArgs, config_path: &Path) -> Result<ExitCode> {
    let mut changed = false;
    if let Some(root) = &args.library_root {
        settings.library_root = Some(root.clone());
        changed = true;
    }
    if let Some(tolerance) = args.tolerance {
        settings.bpm_tolerance = tolerance;
        changed = true;
    }
    if let Some(analyzer) = &args.analyzer {
        settings.analyzer_path = Some(analyzer.clone());
        changed = true;
    }
    if let Some(timeout) = args.timeout {
        settings.analyzer_timeout_secs = timeout;
        changed = true;
    }

    if changed {
        settings.save(config_path)?;
        println!("Saved settings to {}", config_path.display());
    }

    let show = |p: &Option<PathBuf>| {
        p.as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(not set)".to_string())
    };
    println!("library_root:          {}", show(&settings.library_root));
    println!("bpm_tolerance:         {}", settings.bpm_tolerance);
    println!("analyzer_path:         {}", show(&settings.analyzer_path));
    println!("analyzer_timeout_secs: {}", settings.analyzer_timeout_secs);
    Ok(ExitCode::SUCCESS)
}
