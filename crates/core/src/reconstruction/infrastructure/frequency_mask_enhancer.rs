use crate::reconstruction::domain::segment_enhancer::SegmentEnhancer;
use crate::signal::band_pass;

const FILTER_ORDER: usize = 4;

/// Band-limits a segment to the expected voice range of the target
/// speaker, cutting rumble and out-of-register interference residue.
pub struct FrequencyMaskEnhancer {
    low_hz: f64,
    high_hz: f64,
}

impl FrequencyMaskEnhancer {
    pub fn new(low_hz: f64, high_hz: f64) -> Self {
        Self { low_hz, high_hz }
    }

    /// Pass band suited to higher-pitched voices.
    pub fn high_pitch_profile() -> Self {
        Self::new(160.0, 4000.0)
    }

    /// Pass band suited to lower-pitched voices.
    pub fn low_pitch_profile() -> Self {
        Self::new(70.0, 3000.0)
    }
}

impl SegmentEnhancer for FrequencyMaskEnhancer {
    fn enhance(&self, samples: &mut Vec<f32>, sample_rate: u32) {
        let coeffs = band_pass::design_bandpass(self.low_hz, self.high_hz, FILTER_ORDER, sample_rate);
        *samples = band_pass::apply_filter(samples, &coeffs);
    }
}
