use crate::shared::constants::{CHROMA_BINS, MFCC_COEFFS};

/// Acoustic summary of one stretch of audio.
///
/// Pitch statistics cover voiced frames only; when no frame is voiced the
/// four pitch fields are zero and `voiced_ratio` is zero.
#[derive(Debug, Clone)]
pub struct FeatureVector {
    pub mfcc_mean: [f64; MFCC_COEFFS],
    pub mfcc_std: [f64; MFCC_COEFFS],
    pub pitch_mean: f64,
    pub pitch_std: f64,
    pub voiced_ratio: f64,
    pub spectral_centroid: f64,
    pub spectral_bandwidth: f64,
    pub spectral_rolloff: f64,
    pub zero_crossing_rate: f64,
    pub rms_energy: f64,
    pub chroma: [f64; CHROMA_BINS],
}

impl FeatureVector {
    /// At least one voiced frame contributed pitch statistics.
    pub fn has_pitch(&self) -> bool {
        self.voiced_ratio > 0.0 && self.pitch_mean > 0.0
    }

    /// Every field is a finite number.
    pub fn is_finite(&self) -> bool {
        self.mfcc_mean.iter().all(|v| v.is_finite())
            && self.mfcc_std.iter().all(|v| v.is_finite())
            && self.chroma.iter().all(|v| v.is_finite())
            && [
                self.pitch_mean,
                self.pitch_std,
                self.voiced_ratio,
                self.spectral_centroid,
                self.spectral_bandwidth,
                self.spectral_rolloff,
                self.zero_crossing_rate,
                self.rms_energy,
            ]
            .iter()
            .all(|v| v.is_finite())
    }
}
