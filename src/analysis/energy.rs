//! Energy scoring

use crate::analysis::traits::EnergyScorer;
use crate::types::Track;

/// Energy sub-score used until real energy data is available
pub const PLACEHOLDER_ENERGY_SCORE: f64 = 0.8;

/// Scores every candidate with [`PLACEHOLDER_ENERGY_SCORE`]
///
/// `Track::energy` is ignored on purpose; the matching weights were tuned
/// against this constant.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderEnergyScorer;

impl EnergyScorer for PlaceholderEnergyScorer {
    fn score(&self, _candidate: &Track) -> f64 {
        PLACEHOLDER_ENERGY_SCORE
    }

    fn name(&self) -> &'static str {
        "placeholder"
    }
}
