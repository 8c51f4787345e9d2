use crate::signal::stft;

/// Default noise power as a fraction of the mean spectral power.
pub const DEFAULT_NOISE_POWER_RATIO: f64 = 0.1;

/// Wiener filtering with a flat noise-power estimate.
///
/// The noise power is `noise_power_ratio` times the mean power over all
/// bins and frames, and each bin is scaled by the gain `S / (S + N)`.
/// A ratio of zero or less returns the input unchanged.
pub fn wiener_filter(
    samples: &[f32],
    frame_len: usize,
    hop_len: usize,
    noise_power_ratio: f64,
) -> Vec<f32> {
    if noise_power_ratio <= 0.0 {
        return samples.to_vec();
    }

    let mut spec = stft::analyze(samples, frame_len, hop_len);
    if spec.frames.is_empty() {
        return samples.to_vec();
    }

    let bins = spec.bins();
    let mut total_power = 0.0f64;
    let mut count = 0usize;
    for frame in &spec.frames {
        for c in &frame[..bins] {
            total_power += c.norm_sqr();
            count += 1;
        }
    }
    // A silent input has nothing to scale and would turn the per-bin
    // gain into 0/0.
    if total_power <= 0.0 {
        return samples.to_vec();
    }
    let noise_power = noise_power_ratio * total_power / count as f64;

    for frame in &mut spec.frames {
        for c in frame[..bins].iter_mut() {
            let power = c.norm_sqr();
            *c *= power / (power + noise_power);
        }
    }

    stft::synthesize(&spec, samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(freq: f64, len: usize, sample_rate: u32) -> Vec<f32> {
        (0..len)
            .map(|i| {
                let t = i as f64 / sample_rate as f64;
                (2.0 * PI * freq * t).sin() as f32
            })
            .collect()
    }

    #[test]
    fn test_non_positive_ratio_is_identity() {
        let signal = sine(440.0, 4000, 16000);
        assert_eq!(wiener_filter(&signal, 1024, 256, 0.0), signal);
        assert_eq!(wiener_filter(&signal, 1024, 256, -1.0), signal);
    }

    #[test]
    fn test_gain_never_amplifies() {
        let signal = sine(440.0, 16000, 16000);
        let out = wiener_filter(&signal, 1024, 256, 0.5);

        let in_energy: f64 = signal.iter().map(|&s| (s as f64).powi(2)).sum();
        let out_energy: f64 = out.iter().map(|&s| (s as f64).powi(2)).sum();
        assert!(out_energy <= in_energy);
        assert!(out_energy > 0.0);
    }

    #[test]
    fn test_silent_input_stays_silent() {
        let signal = vec![0.0f32; 4000];
        let out = wiener_filter(&signal, 1024, 256, DEFAULT_NOISE_POWER_RATIO);

        assert_eq!(out.len(), signal.len());
        assert!(out.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_short_input_passes_through() {
        let signal = sine(440.0, 50, 16000);
        assert_eq!(wiener_filter(&signal, 1024, 256, 0.1), signal);
    }
}
