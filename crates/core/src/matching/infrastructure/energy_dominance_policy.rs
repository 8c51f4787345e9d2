use crate::matching::domain::scoring_policy::{PolicyContext, ScoringPolicy};

pub const DEFAULT_RATIO_THRESHOLD: f64 = 0.6;
pub const DEFAULT_BONUS: f64 = 0.15;

/// Rewards segments whose level is comparable to the reference.
///
/// Useful for recordings where the target speaker is known to be the
/// dominant voice; quiet interference then scores below the attenuate
/// band even when its timbre is close. Opt-in, not installed by default.
pub struct EnergyDominancePolicy {
    ratio_threshold: f64,
    bonus: f64,
}

impl EnergyDominancePolicy {
    pub fn new(ratio_threshold: f64, bonus: f64) -> Self {
        Self {
            ratio_threshold,
            bonus,
        }
    }
}

impl Default for EnergyDominancePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RATIO_THRESHOLD, DEFAULT_BONUS)
    }
}

impl ScoringPolicy for EnergyDominancePolicy {
    fn adjust(&self, ctx: &PolicyContext) -> f64 {
        let reference = ctx.reference_features.rms_energy;
        if reference <= 0.0 {
            return 0.0;
        }
        let ratio = ctx.segment_features.rms_energy / reference;
        if ratio >= self.ratio_threshold {
            self.bonus
        } else {
            0.0
        }
    }
}
