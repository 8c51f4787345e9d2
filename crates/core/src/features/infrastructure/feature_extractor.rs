use ndarray::{Array2, Axis};

use crate::features::domain::feature_vector::FeatureVector;
use crate::features::infrastructure::{mel, pitch};
use crate::shared::audio_buffer;
use crate::shared::constants::{
    CHROMA_BINS, DEFAULT_FRAME_LEN, DEFAULT_HOP_LEN, MEL_BINS, MFCC_COEFFS, PRE_EMPHASIS,
};
use crate::signal::stft;

/// Fraction of cumulative spectral energy defining the rolloff point.
const ROLLOFF_FRACTION: f64 = 0.85;

/// Frame-based acoustic feature extraction for a fixed sample rate.
pub struct FeatureExtractor {
    sample_rate: u32,
    frame_len: usize,
    hop_len: usize,
}

impl FeatureExtractor {
    pub fn new(sample_rate: u32) -> Self {
        Self::with_frames(sample_rate, DEFAULT_FRAME_LEN, DEFAULT_HOP_LEN)
    }

    pub fn with_frames(sample_rate: u32, frame_len: usize, hop_len: usize) -> Self {
        Self {
            sample_rate,
            frame_len,
            hop_len,
        }
    }

    /// Full feature summary of a span of samples.
    ///
    /// Returns `None` when the span is shorter than one analysis frame
    /// or contains no signal at all.
    pub fn extract(&self, samples: &[f32]) -> Option<FeatureVector> {
        if samples.len() < self.frame_len {
            return None;
        }
        let rms_energy = audio_buffer::rms_of(samples);
        if rms_energy <= 0.0 {
            return None;
        }

        let mfcc = self.mfcc_frames(samples)?;
        let mfcc_mean_arr = mfcc.mean_axis(Axis(0))?;
        let mfcc_std_arr = mfcc.std_axis(Axis(0), 0.0);
        let mut mfcc_mean = [0.0f64; MFCC_COEFFS];
        let mut mfcc_std = [0.0f64; MFCC_COEFFS];
        for i in 0..MFCC_COEFFS {
            mfcc_mean[i] = mfcc_mean_arr[i];
            mfcc_std[i] = mfcc_std_arr[i];
        }

        let spec = stft::analyze(samples, self.frame_len, self.hop_len);
        let freqs = stft::fft_frequencies(self.sample_rate, self.frame_len);
        let (spectral_centroid, spectral_bandwidth, spectral_rolloff) =
            self.spectral_shape(&spec, &freqs);
        let chroma = self.chroma(&spec, &freqs);

        let pitches =
            pitch::detect_pitch_frames(samples, self.sample_rate, self.frame_len, self.hop_len);
        let voiced: Vec<f64> = pitches.iter().flatten().copied().collect();
        let (pitch_mean, pitch_std, voiced_ratio) = if voiced.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            let mean = voiced.iter().sum::<f64>() / voiced.len() as f64;
            let var =
                voiced.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / voiced.len() as f64;
            (mean, var.sqrt(), voiced.len() as f64 / pitches.len() as f64)
        };

        let sign_changes = samples
            .windows(2)
            .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
            .count();
        let zero_crossing_rate = sign_changes as f64 / (samples.len() - 1) as f64;

        Some(FeatureVector {
            mfcc_mean,
            mfcc_std,
            pitch_mean,
            pitch_std,
            voiced_ratio,
            spectral_centroid,
            spectral_bandwidth,
            spectral_rolloff,
            zero_crossing_rate,
            rms_energy,
            chroma,
        })
    }

    /// Per-frame MFCC matrix, one row per frame.
    ///
    /// Log mel energies over a 40-band filter bank, decorrelated with a
    /// DCT-II; the zeroth (overall energy) coefficient is dropped.
    pub fn mfcc_frames(&self, samples: &[f32]) -> Option<Array2<f64>> {
        let emphasized = pre_emphasize(samples);
        let spec = stft::analyze(&emphasized, self.frame_len, self.hop_len);
        if spec.frames.is_empty() {
            return None;
        }

        let bank = mel::mel_filter_bank(MEL_BINS, self.frame_len, self.sample_rate);
        let mut rows = Vec::with_capacity(spec.frames.len());
        for frame_idx in 0..spec.frames.len() {
            let mags = spec.frame_magnitudes(frame_idx);
            let log_mel: Vec<f64> = bank
                .iter()
                .map(|filter| {
                    let energy: f64 = filter
                        .iter()
                        .zip(&mags)
                        .map(|(&w, &m)| w * m * m)
                        .sum();
                    (energy + 1e-10).ln()
                })
                .collect();
            let coeffs = mel::dct_ii(&log_mel, MFCC_COEFFS + 1);
            rows.extend_from_slice(&coeffs[1..]);
        }

        Array2::from_shape_vec((spec.frames.len(), MFCC_COEFFS), rows).ok()
    }

    fn spectral_shape(&self, spec: &stft::Spectrogram, freqs: &[f64]) -> (f64, f64, f64) {
        let mut centroids = Vec::new();
        let mut bandwidths = Vec::new();
        let mut rolloffs = Vec::new();

        for frame_idx in 0..spec.frames.len() {
            let mags = spec.frame_magnitudes(frame_idx);
            let total: f64 = mags.iter().sum();
            if total <= 0.0 {
                continue;
            }

            let centroid: f64 =
                freqs.iter().zip(&mags).map(|(&f, &m)| f * m).sum::<f64>() / total;
            let variance: f64 = freqs
                .iter()
                .zip(&mags)
                .map(|(&f, &m)| (f - centroid).powi(2) * m)
                .sum::<f64>()
                / total;

            let threshold = ROLLOFF_FRACTION * total;
            let mut cumulative = 0.0;
            let mut rolloff = *freqs.last().unwrap_or(&0.0);
            for (k, &m) in mags.iter().enumerate() {
                cumulative += m;
                if cumulative >= threshold {
                    rolloff = freqs[k];
                    break;
                }
            }

            centroids.push(centroid);
            bandwidths.push(variance.sqrt());
            rolloffs.push(rolloff);
        }

        if centroids.is_empty() {
            return (0.0, 0.0, 0.0);
        }
        let mean = |v: &[f64]| v.iter().sum::<f64>() / v.len() as f64;
        (mean(&centroids), mean(&bandwidths), mean(&rolloffs))
    }

    fn chroma(&self, spec: &stft::Spectrogram, freqs: &[f64]) -> [f64; CHROMA_BINS] {
        let mut chroma = [0.0f64; CHROMA_BINS];
        for frame_idx in 0..spec.frames.len() {
            let mags = spec.frame_magnitudes(frame_idx);
            for (&f, &m) in freqs.iter().zip(&mags) {
                if f < 20.0 {
                    continue;
                }
                let midi = 69.0 + 12.0 * (f / 440.0).log2();
                let class = (midi.round() as i64).rem_euclid(CHROMA_BINS as i64) as usize;
                chroma[class] += m;
            }
        }
        let total: f64 = chroma.iter().sum();
        if total > 0.0 {
            for c in &mut chroma {
                *c /= total;
            }
        }
        chroma
    }
}

fn pre_emphasize(samples: &[f32]) -> Vec<f32> {
    let mut out = Vec::with_capacity(samples.len());
    if let Some(&first) = samples.first() {
        out.push(first);
        for w in samples.windows(2) {
            out.push(w[1] - PRE_EMPHASIS * w[0]);
        }
    }
    out
}
