//! Matching engine
//!
//! Ranks library tracks against a reference BPM and Camelot key.
//!
//! A candidate first has to fall into one of three tempo windows, checked
//! in order: direct (within the tolerance), half-time (within half the
//! tolerance of half the reference BPM) or double-time (within twice the
//! tolerance of double the reference BPM). Candidates outside all windows
//! are dropped. The rest are scored:
//!
//! ```text
//! score = 0.5 * bpm + 0.4 * key + 0.1 * energy
//! ```
//!
//! where the BPM sub-score falls linearly from 1.0 to 0.7 across the direct
//! window and is a flat 0.85 for half/double-time matches.

use crate::analysis::energy::PlaceholderEnergyScorer;
use crate::analysis::key::camelot;
use crate::analysis::traits::EnergyScorer;
use crate::types::{MatchResult, MatchType, Track};

/// Weight of the BPM sub-score
pub const BPM_WEIGHT: f64 = 0.5;
/// Weight of the key sub-score
pub const KEY_WEIGHT: f64 = 0.4;
/// Weight of the energy sub-score
pub const ENERGY_WEIGHT: f64 = 0.1;

/// BPM sub-score for half-time and double-time matches
// TODO: scale by closeness inside the relaxed window like direct matches
pub const RELATED_TEMPO_SCORE: f64 = 0.85;
/// How much of the BPM sub-score a direct match loses at the tolerance edge
pub const DIRECT_FALLOFF: f64 = 0.3;
/// Key sub-score when either side has no Camelot code
pub const UNKNOWN_KEY_SCORE: f64 = 0.5;

pub const DEFAULT_TOLERANCE: f64 = 3.0;
pub const DEFAULT_LIMIT: usize = 15;

/// Allowed tempo deviation for a direct match
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BpmTolerance {
    /// Fixed number of BPM
    Absolute(f64),
    /// Percentage of the reference BPM
    Percent(f64),
}

impl BpmTolerance {
    /// Tolerance in BPM for the given reference tempo
    pub fn resolve(self, reference_bpm: f64) -> f64 {
        match self {
            BpmTolerance::Absolute(bpm) => bpm,
            BpmTolerance::Percent(percent) => reference_bpm.abs() * percent / 100.0,
        }
    }
}

impl Default for BpmTolerance {
    fn default() -> Self {
        BpmTolerance::Absolute(DEFAULT_TOLERANCE)
    }
}

/// Query options for [`find_matches`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOptions {
    pub tolerance: BpmTolerance,
    /// Maximum number of results
    pub limit: usize,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            tolerance: BpmTolerance::default(),
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Classify the tempo relationship of `candidate_bpm` to `reference_bpm`
///
/// Returns `None` if the candidate is in none of the three windows.
pub fn classify_tempo(reference_bpm: f64, candidate_bpm: f64, tolerance: f64) -> Option<MatchType> {
    if (candidate_bpm - reference_bpm).abs() <= tolerance {
        Some(MatchType::Direct)
    } else if (candidate_bpm - reference_bpm / 2.0).abs() <= tolerance / 2.0 {
        Some(MatchType::HalfTime)
    } else if (candidate_bpm - reference_bpm * 2.0).abs() <= tolerance * 2.0 {
        Some(MatchType::DoubleTime)
    } else {
        None
    }
}

/// Check if two BPMs are compatible for mixing
///
/// `bpm_b` is classified against `bpm_a`. When incompatible the match type
/// is `Direct` and carries no meaning; check the boolean.
pub fn bpm_compatible(bpm_a: f64, bpm_b: f64, tolerance: f64) -> (bool, MatchType) {
    match classify_tempo(bpm_a, bpm_b, tolerance) {
        Some(match_type) => (true, match_type),
        None => (false, MatchType::Direct),
    }
}

fn bpm_score(match_type: MatchType, delta: f64, tolerance: f64) -> f64 {
    match match_type {
        MatchType::Direct if tolerance > 0.0 => 1.0 - (delta / tolerance) * DIRECT_FALLOFF,
        // Zero tolerance only admits exact matches
        MatchType::Direct => 1.0,
        MatchType::HalfTime | MatchType::DoubleTime => RELATED_TEMPO_SCORE,
    }
}

fn key_score(reference: Option<&str>, candidate: Option<&str>) -> f64 {
    match (reference, candidate) {
        (Some(reference), Some(candidate)) => camelot::compatibility(reference, candidate),
        _ => UNKNOWN_KEY_SCORE,
    }
}

/// Find tracks that mix well with the reference BPM and key
///
/// Uses the placeholder energy score. Tracks without a BPM are skipped.
/// Results are sorted by descending score (equal scores keep library order)
/// and truncated to `options.limit`.
pub fn find_matches<'a>(
    reference_bpm: f64,
    reference_camelot: Option<&str>,
    library: &'a [Track],
    options: &MatchOptions,
) -> Vec<MatchResult<'a>> {
    find_matches_with(
        reference_bpm,
        reference_camelot,
        library,
        options,
        &PlaceholderEnergyScorer,
    )
}

/// [`find_matches`] with a custom energy scorer
pub fn find_matches_with<'a>(
    reference_bpm: f64,
    reference_camelot: Option<&str>,
    library: &'a [Track],
    options: &MatchOptions,
    energy: &dyn EnergyScorer,
) -> Vec<MatchResult<'a>> {
    rank(library.iter(), reference_bpm, reference_camelot, options, energy)
}

/// Find matches for a track from the library, excluding the track itself
///
/// Returns nothing if the reference has no BPM yet.
pub fn find_matches_for<'a>(
    reference: &Track,
    library: &'a [Track],
    options: &MatchOptions,
) -> Vec<MatchResult<'a>> {
    let Some(reference_bpm) = reference.bpm else {
        return Vec::new();
    };

    rank(
        library.iter().filter(|t| t.path != reference.path),
        reference_bpm,
        reference.camelot(),
        options,
        &PlaceholderEnergyScorer,
    )
}

fn rank<'a>(
    candidates: impl Iterator<Item = &'a Track>,
    reference_bpm: f64,
    reference_camelot: Option<&str>,
    options: &MatchOptions,
    energy: &dyn EnergyScorer,
) -> Vec<MatchResult<'a>> {
    let tolerance = options.tolerance.resolve(reference_bpm);

    let mut results: Vec<MatchResult<'a>> = candidates
        .filter_map(|track| {
            let track_bpm = track.bpm?;
            let match_type = classify_tempo(reference_bpm, track_bpm, tolerance)?;

            let bpm = bpm_score(match_type, (track_bpm - reference_bpm).abs(), tolerance);
            let key = key_score(reference_camelot, track.camelot());
            let energy = energy.score(track);

            Some(MatchResult {
                track,
                score: bpm * BPM_WEIGHT + key * KEY_WEIGHT + energy * ENERGY_WEIGHT,
                match_type,
            })
        })
        .collect();

    // Stable sort keeps library order among equal scores
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results.truncate(options.limit);
    results
}
