use crate::shared::audio_buffer::{rms_of, AudioBuffer};

/// Gain applied to segments ruled out by the scorer.
pub const DEFAULT_SUPPRESS_GAIN: f64 = 0.05;
/// Residual gain applied to samples no segment covers.
pub const DEFAULT_UNCOVERED_GAIN: f64 = 0.02;

#[derive(Debug, Clone)]
pub struct ReconstructionConfig {
    pub suppress_gain: f64,
    pub uncovered_gain: f64,
    /// Peak ceiling for the attenuate-only normalization pass.
    pub normalize_peak: f64,
    pub compressor_threshold: f64,
    /// Gain slope above the compressor threshold.
    pub compressor_slope: f64,
    /// Frames quieter than this fraction of the output RMS are muted.
    pub noise_gate_ratio: f64,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            suppress_gain: DEFAULT_SUPPRESS_GAIN,
            uncovered_gain: DEFAULT_UNCOVERED_GAIN,
            normalize_peak: 0.95,
            compressor_threshold: 0.95,
            compressor_slope: 0.25,
            noise_gate_ratio: 0.05,
        }
    }
}

/// One scored segment's samples, ready to be written into the output.
#[derive(Debug, Clone)]
pub struct Placement {
    pub start_sample: usize,
    pub samples: Vec<f32>,
    /// Blending weight and amplitude gain for this span.
    pub gain: f64,
}

/// Assembles the output signal from scored segment placements.
///
/// Overlapping placements are blended weighted by their gains, so a
/// confident keep drowns out a suppressed overlap instead of averaging
/// with it. After assembly the signal is DC-centered, softly compressed,
/// noise-gated and peak-limited; the output never gets louder than what
/// the placements put in.
pub struct Reconstructor {
    config: ReconstructionConfig,
}

impl Reconstructor {
    pub fn new(config: ReconstructionConfig) -> Self {
        Self { config }
    }

    /// Rebuilds the output from the placements. The per-sample weight
    /// array exists only for the duration of the call.
    pub fn reconstruct(&self, mixed: &AudioBuffer, placements: &[Placement]) -> AudioBuffer {
        let n = mixed.len();
        let mut value = vec![0.0f64; n];
        let mut weight = vec![0.0f64; n];

        for placement in placements {
            if placement.gain <= 0.0 {
                continue;
            }
            for (i, &s) in placement.samples.iter().enumerate() {
                let idx = placement.start_sample + i;
                if idx >= n {
                    break;
                }
                let v = s as f64 * placement.gain;
                let w_old = weight[idx];
                value[idx] = (value[idx] * w_old + v * placement.gain) / (w_old + placement.gain);
                // Saturating accumulation; a pile of overlaps must not
                // pin the blend to whatever landed first.
                weight[idx] = (w_old + placement.gain).min(1.0);
            }
        }

        let mut output: Vec<f32> = (0..n)
            .map(|i| {
                if weight[i] > 0.0 {
                    value[i] as f32
                } else {
                    mixed.samples()[i] * self.config.uncovered_gain as f32
                }
            })
            .collect();

        self.post_process(&mut output);
        AudioBuffer::new(output, mixed.sample_rate())
    }

    fn post_process(&self, samples: &mut [f32]) {
        if samples.is_empty() {
            return;
        }

        let mean = samples.iter().map(|&s| s as f64).sum::<f64>() / samples.len() as f64;
        for s in samples.iter_mut() {
            *s -= mean as f32;
        }

        let threshold = self.config.compressor_threshold as f32;
        let slope = self.config.compressor_slope as f32;
        for s in samples.iter_mut() {
            let mag = s.abs();
            if mag > threshold {
                *s = s.signum() * (threshold + (mag - threshold) * slope);
            }
        }

        let gate = self.config.noise_gate_ratio * rms_of(samples);
        if gate > 0.0 {
            // 20 ms gating frames; short trailing remainder included.
            let frame = (samples.len() / 100).max(1).min(samples.len());
            for chunk in samples.chunks_mut(frame) {
                if rms_of(chunk) < gate {
                    chunk.fill(0.0);
                }
            }
        }

        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);
        let ceiling = self.config.normalize_peak as f32;
        if peak > ceiling {
            let scale = ceiling / peak;
            for s in samples.iter_mut() {
                *s *= scale;
            }
        }
    }
}

impl Default for Reconstructor {
    fn default() -> Self {
        Self::new(ReconstructionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    const SAMPLE_RATE: u32 = 16000;

    fn tone(freq: f64, len: usize, amplitude: f64) -> Vec<f32> {
        (0..len)
            .map(|i| {
                let t = i as f64 / SAMPLE_RATE as f64;
                (amplitude * (2.0 * PI * freq * t).sin()) as f32
            })
            .collect()
    }

    #[test]
    fn test_output_length_matches_input() {
        let mixed = AudioBuffer::new(tone(200.0, 8000, 0.5), SAMPLE_RATE);
        let out = Reconstructor::default().reconstruct(&mixed, &[]);
        assert_eq!(out.len(), 8000);
    }

    #[test]
    fn test_uncovered_samples_are_nearly_silent() {
        let mixed = AudioBuffer::new(tone(200.0, 8000, 0.5), SAMPLE_RATE);
        let out = Reconstructor::default().reconstruct(&mixed, &[]);
        assert!(out.rms() < 0.05 * mixed.rms());
    }

    #[test]
    fn test_kept_placement_preserves_level() {
        let samples = tone(200.0, 16000, 0.9);
        let mixed = AudioBuffer::new(samples.clone(), SAMPLE_RATE);
        let placement = Placement {
            start_sample: 0,
            samples,
            gain: 1.0,
        };
        let out = Reconstructor::default().reconstruct(&mixed, &[placement]);
        assert_relative_eq!(out.rms(), mixed.rms(), max_relative = 0.02);
    }

    #[test]
    fn test_keep_dominates_overlapping_suppress() {
        let kept = tone(200.0, 8000, 0.8);
        let mixed = AudioBuffer::new(kept.clone(), SAMPLE_RATE);
        let suppressed = Placement {
            start_sample: 0,
            samples: tone(400.0, 8000, 0.8),
            gain: 0.05,
        };
        let keep = Placement {
            start_sample: 0,
            samples: kept.clone(),
            gain: 1.0,
        };
        let out = Reconstructor::default().reconstruct(&mixed, &[suppressed, keep]);

        // The blend is dominated by the unit-gain placement.
        let diff_rms = {
            let diff: Vec<f32> = out
                .samples()
                .iter()
                .zip(&kept)
                .map(|(&a, &b)| a - b)
                .collect();
            crate::shared::audio_buffer::rms_of(&diff)
        };
        assert!(diff_rms < 0.1 * mixed.rms());
    }

    #[test]
    fn test_accumulated_weight_saturates_at_unity() {
        // Two unit-gain copies of the tone followed by a unit-gain
        // silent placement. With the weight capped at one the silent
        // span pulls the blend to exactly half the tone; an uncapped
        // weight of two would leave it at two thirds.
        let samples = tone(200.0, 8000, 0.8);
        let mixed = AudioBuffer::new(samples.clone(), SAMPLE_RATE);
        let placements = vec![
            Placement {
                start_sample: 0,
                samples: samples.clone(),
                gain: 1.0,
            },
            Placement {
                start_sample: 0,
                samples: samples.clone(),
                gain: 1.0,
            },
            Placement {
                start_sample: 0,
                samples: vec![0.0f32; 8000],
                gain: 1.0,
            },
        ];
        let out = Reconstructor::default().reconstruct(&mixed, &placements);
        assert_relative_eq!(out.rms(), 0.5 * mixed.rms(), max_relative = 0.02);
    }

    #[test]
    fn test_peaks_are_limited_to_ceiling() {
        let loud = tone(200.0, 16000, 1.6);
        let mixed = AudioBuffer::new(loud.clone(), SAMPLE_RATE);
        let placement = Placement {
            start_sample: 0,
            samples: loud,
            gain: 1.0,
        };
        let out = Reconstructor::default().reconstruct(&mixed, &[placement]);
        let peak = out.samples().iter().map(|s| s.abs()).fold(0.0f32, f32::max);
        assert!(peak <= 0.95 + 1e-6);
    }

    #[test]
    fn test_placement_past_end_is_truncated() {
        let mixed = AudioBuffer::new(vec![0.0f32; 1000], SAMPLE_RATE);
        let placement = Placement {
            start_sample: 900,
            samples: tone(200.0, 500, 0.5),
            gain: 1.0,
        };
        let out = Reconstructor::default().reconstruct(&mixed, &[placement]);
        assert_eq!(out.len(), 1000);
    }
}
