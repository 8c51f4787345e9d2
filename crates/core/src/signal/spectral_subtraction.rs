use crate::signal::stft;

/// Over-subtraction factor applied to the estimated noise magnitude.
pub const DEFAULT_ALPHA: f64 = 1.5;
/// Spectral floor keeping each bin above this fraction of its magnitude.
pub const DEFAULT_BETA: f64 = 0.1;
/// Number of leading frames assumed to contain only noise.
pub const DEFAULT_NOISE_FRAMES: usize = 5;

/// Magnitude-domain spectral subtraction.
///
/// The noise spectrum is estimated as the mean magnitude of the first
/// `noise_frames` frames, then `alpha` times that estimate is subtracted
/// from every frame with a floor of `beta` times the original magnitude.
/// Phase is carried over unchanged. With `alpha == 0.0` and `beta <= 1.0`
/// the signal passes through unmodified up to reconstruction error.
pub fn spectral_subtract(
    samples: &[f32],
    frame_len: usize,
    hop_len: usize,
    noise_frames: usize,
    alpha: f64,
    beta: f64,
) -> Vec<f32> {
    let mut spec = stft::analyze(samples, frame_len, hop_len);
    if spec.frames.is_empty() {
        return samples.to_vec();
    }

    let bins = spec.bins();
    let estimate_frames = noise_frames.min(spec.frames.len());
    let mut noise_mag = vec![0.0f64; bins];
    for frame in &spec.frames[..estimate_frames] {
        for (k, c) in frame[..bins].iter().enumerate() {
            noise_mag[k] += c.norm();
        }
    }
    for m in &mut noise_mag {
        *m /= estimate_frames as f64;
    }

    for frame in &mut spec.frames {
        for k in 0..bins {
            let mag = frame[k].norm();
            let cleaned = (mag - alpha * noise_mag[k]).max(beta * mag);
            if mag > 0.0 {
                frame[k] *= cleaned / mag;
            }
        }
    }

    stft::synthesize(&spec, samples)
}
