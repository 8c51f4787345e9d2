use crate::reconstruction::domain::segment_enhancer::SegmentEnhancer;
use crate::shared::constants::{DEFAULT_FRAME_LEN, DEFAULT_HOP_LEN};
use crate::signal::spectral_subtraction::{
    spectral_subtract, DEFAULT_ALPHA, DEFAULT_BETA, DEFAULT_NOISE_FRAMES,
};

/// Denoises a segment by subtracting a noise spectrum estimated from
/// its leading frames.
pub struct SpectralSubtractionEnhancer {
    frame_len: usize,
    hop_len: usize,
    noise_frames: usize,
    alpha: f64,
    beta: f64,
}

impl SpectralSubtractionEnhancer {
    pub fn new(noise_frames: usize, alpha: f64, beta: f64) -> Self {
        Self {
            frame_len: DEFAULT_FRAME_LEN,
            hop_len: DEFAULT_HOP_LEN,
            noise_frames,
            alpha,
            beta,
        }
    }
}

impl Default for SpectralSubtractionEnhancer {
    fn default() -> Self {
        Self::new(DEFAULT_NOISE_FRAMES, DEFAULT_ALPHA, DEFAULT_BETA)
    }
}

impl SegmentEnhancer for SpectralSubtractionEnhancer {
    fn enhance(&self, samples: &mut Vec<f32>, _sample_rate: u32) {
        *samples = spectral_subtract(
            samples,
            self.frame_len,
            self.hop_len,
            self.noise_frames,
            self.alpha,
            self.beta,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enhance_preserves_length() {
        let mut samples: Vec<f32> = (0..8000).map(|i| (i as f32 * 0.01).sin() * 0.5).collect();
        SpectralSubtractionEnhancer::default().enhance(&mut samples, 16000);
        assert_eq!(samples.len(), 8000);
    }
}
