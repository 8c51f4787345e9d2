use crate::matching::domain::scoring_policy::{PolicyContext, ScoringPolicy};
use crate::shared::constants::{DEFAULT_FRAME_LEN, DEFAULT_HOP_LEN};
use crate::signal::stft;

pub const DEFAULT_SPLIT_HZ: f64 = 160.0;
pub const DEFAULT_PENALTY_WEIGHT: f64 = 0.35;

/// Penalizes segments whose energy sits in a different part of the
/// spectrum than the reference.
///
/// Compares the fraction of spectral power below `split_hz` on both
/// sides and subtracts `penalty_weight` times the difference. Catches
/// interference that mimics the reference's timbre statistics while
/// living in another register.
pub struct SpectralBalancePolicy {
    split_hz: f64,
    penalty_weight: f64,
}

impl SpectralBalancePolicy {
    pub fn new(split_hz: f64, penalty_weight: f64) -> Self {
        Self {
            split_hz,
            penalty_weight,
        }
    }

    fn low_band_ratio(&self, samples: &[f32], sample_rate: u32) -> Option<f64> {
        let spec = stft::analyze(samples, DEFAULT_FRAME_LEN, DEFAULT_HOP_LEN);
        if spec.frames.is_empty() {
            return None;
        }
        let freqs = stft::fft_frequencies(sample_rate, DEFAULT_FRAME_LEN);

        let mut low = 0.0f64;
        let mut total = 0.0f64;
        for frame_idx in 0..spec.frames.len() {
            for (k, m) in spec.frame_magnitudes(frame_idx).into_iter().enumerate() {
                let power = m * m;
                total += power;
                if freqs[k] < self.split_hz {
                    low += power;
                }
            }
        }
        if total <= 0.0 {
            return None;
        }
        Some(low / total)
    }
}

impl Default for SpectralBalancePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_SPLIT_HZ, DEFAULT_PENALTY_WEIGHT)
    }
}

impl ScoringPolicy for SpectralBalancePolicy {
    fn adjust(&self, ctx: &PolicyContext) -> f64 {
        let segment = self.low_band_ratio(ctx.segment_samples, ctx.sample_rate);
        let reference = self.low_band_ratio(ctx.reference_samples, ctx.sample_rate);
        match (segment, reference) {
            (Some(s), Some(r)) => -self.penalty_weight * (s - r).abs(),
            _ => 0.0,
        }
    }
}
