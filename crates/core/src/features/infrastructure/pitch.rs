use crate::shared::constants::{PITCH_MAX_HZ, PITCH_MIN_HZ};

/// Normalized autocorrelation must exceed this at the best lag for a
/// frame to count as voiced.
pub const VOICING_THRESHOLD: f64 = 0.3;

/// Autocorrelation pitch tracking over sliding frames.
///
/// Each entry is the detected fundamental in Hz for one frame, or `None`
/// when the frame is unvoiced. Lags are restricted to the 50-500 Hz
/// speech range and the winning lag is refined by parabolic
/// interpolation around the autocorrelation peak.
pub fn detect_pitch_frames(
    samples: &[f32],
    sample_rate: u32,
    frame_len: usize,
    hop_len: usize,
) -> Vec<Option<f64>> {
    if samples.len() < frame_len {
        return Vec::new();
    }

    let num_frames = (samples.len() - frame_len) / hop_len + 1;
    (0..num_frames)
        .map(|i| {
            let start = i * hop_len;
            detect_frame(&samples[start..start + frame_len], sample_rate)
        })
        .collect()
}

fn detect_frame(frame: &[f32], sample_rate: u32) -> Option<f64> {
    let n = frame.len();
    let min_lag = (sample_rate as f64 / PITCH_MAX_HZ).floor() as usize;
    let max_lag = ((sample_rate as f64 / PITCH_MIN_HZ).ceil() as usize).min(n - 1);
    if min_lag >= max_lag {
        return None;
    }

    let energy: f64 = frame.iter().map(|&s| (s as f64) * (s as f64)).sum();
    if energy <= 0.0 {
        return None;
    }

    let autocorr = |lag: usize| -> f64 {
        frame[..n - lag]
            .iter()
            .zip(&frame[lag..])
            .map(|(&a, &b)| a as f64 * b as f64)
            .sum::<f64>()
            / energy
    };

    let mut best_lag = 0usize;
    let mut best_val = VOICING_THRESHOLD;
    for lag in min_lag..=max_lag {
        let r = autocorr(lag);
        if r > best_val {
            best_val = r;
            best_lag = lag;
        }
    }
    if best_lag == 0 {
        return None;
    }

    // Parabolic refinement around the peak for sub-sample lag precision.
    let mut lag = best_lag as f64;
    if best_lag > min_lag && best_lag < max_lag {
        let left = autocorr(best_lag - 1);
        let right = autocorr(best_lag + 1);
        let denom = left - 2.0 * best_val + right;
        if denom.abs() > 1e-12 {
            lag += 0.5 * (left - right) / denom;
        }
    }

    Some(sample_rate as f64 / lag)
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
    fn test_pure_tone_pitch_within_one_hz() {
        let signal = sine(200.0, 8000, 16000);
        let pitches = detect_pitch_frames(&signal, 16000, 1024, 256);
        assert!(!pitches.is_empty());
        for p in pitches.iter().flatten() {
            assert!((p - 200.0).abs() < 1.0, "detected {p}");
        }
        assert!(pitches.iter().all(|p| p.is_some()));
    }

    #[test]
    fn test_silence_is_unvoiced() {
        let signal = vec![0.0f32; 4000];
        let pitches = detect_pitch_frames(&signal, 16000, 1024, 256);
        assert!(pitches.iter().all(|p| p.is_none()));
    }

    #[test]
    fn test_detected_pitch_stays_in_tracked_range() {
        // 2 kHz sits above the speech range; any detection must fold
        // into the tracked lag window.
        let signal = sine(2000.0, 8000, 16000);
        let pitches = detect_pitch_frames(&signal, 16000, 1024, 256);
        for p in pitches.iter().flatten() {
            assert!((PITCH_MIN_HZ..=PITCH_MAX_HZ).contains(p));
        }
    }

    #[test]
    fn test_short_signal_yields_no_frames() {
        let signal = sine(200.0, 100, 16000);
        assert!(detect_pitch_frames(&signal, 16000, 1024, 256).is_empty());
    }
}
