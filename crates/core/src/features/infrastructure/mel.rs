use std::f64::consts::PI;

fn hz_to_mel(hz: f64) -> f64 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

fn mel_to_hz(mel: f64) -> f64 {
    700.0 * (10f64.powf(mel / 2595.0) - 1.0)
}

/// Triangular mel filter bank over the non-negative FFT bins.
///
/// Returns `num_filters` rows of `frame_len / 2 + 1` weights each,
/// spanning 0 Hz to nyquist.
pub fn mel_filter_bank(num_filters: usize, frame_len: usize, sample_rate: u32) -> Vec<Vec<f64>> {
    let bins = frame_len / 2 + 1;
    let nyquist = sample_rate as f64 / 2.0;

    let mel_max = hz_to_mel(nyquist);
    let centers: Vec<f64> = (0..num_filters + 2)
        .map(|i| mel_to_hz(mel_max * i as f64 / (num_filters + 1) as f64))
        .collect();

    let bin_width = sample_rate as f64 / frame_len as f64;
    let mut bank = Vec::with_capacity(num_filters);
    for f in 0..num_filters {
        let (left, center, right) = (centers[f], centers[f + 1], centers[f + 2]);
        let mut filter = vec![0.0f64; bins];
        for (k, w) in filter.iter_mut().enumerate() {
            let freq = k as f64 * bin_width;
            if freq > left && freq < center {
                *w = (freq - left) / (center - left);
            } else if freq >= center && freq < right {
                *w = (right - freq) / (right - center);
            }
        }
        bank.push(filter);
    }
    bank
}

/// DCT-II of the input, truncated to `num_coeffs` coefficients.
pub fn dct_ii(input: &[f64], num_coeffs: usize) -> Vec<f64> {
    let n = input.len() as f64;
    (0..num_coeffs)
        .map(|k| {
            input
                .iter()
                .enumerate()
                .map(|(i, &x)| x * (PI * k as f64 * (i as f64 + 0.5) / n).cos())
                .sum()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mel_scale_round_trip() {
        for hz in [100.0, 440.0, 1000.0, 4000.0] {
            assert_relative_eq!(mel_to_hz(hz_to_mel(hz)), hz, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_filter_bank_shape_and_coverage() {
        let bank = mel_filter_bank(40, 1024, 16000);
        assert_eq!(bank.len(), 40);
        assert_eq!(bank[0].len(), 513);
        for filter in &bank {
            assert!(filter.iter().any(|&w| w > 0.0));
            assert!(filter.iter().all(|&w| (0.0..=1.0).contains(&w)));
        }
    }

    #[test]
    fn test_dct_of_constant_concentrates_in_first_coefficient() {
        let out = dct_ii(&[1.0; 16], 4);
        assert_relative_eq!(out[0], 16.0, epsilon = 1e-9);
        for c in &out[1..] {
            assert_relative_eq!(*c, 0.0, epsilon = 1e-9);
        }
    }
}
