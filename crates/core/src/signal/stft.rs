use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use std::f64::consts::PI;

/// Window-sum values below this are treated as uncovered output positions.
/// Dividing by a near-zero sum at the first and last few samples turns the
/// residual ringing of a modified spectrum into large spikes, so positions
/// with negligible coverage take the fallback instead.
const WINDOW_SUM_FLOOR: f64 = 1e-2;

/// Hann window of the given length.
pub fn hann_window(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / len as f64).cos()))
        .collect()
}

/// Center frequency of each non-negative FFT bin, in Hz.
///
/// Returns `frame_len / 2 + 1` values from 0 to nyquist.
pub fn fft_frequencies(sample_rate: u32, frame_len: usize) -> Vec<f64> {
    let bin_width = sample_rate as f64 / frame_len as f64;
    (0..=frame_len / 2).map(|k| k as f64 * bin_width).collect()
}

/// Complex STFT of a signal plus the geometry needed to invert it.
///
/// Each frame holds the full `frame_len`-point spectrum. Consumers that
/// modify the spectrum only need to touch the non-negative bins
/// (`0..=frame_len / 2`); [`synthesize`] re-mirrors the negative half.
pub struct Spectrogram {
    pub frames: Vec<Vec<Complex<f64>>>,
    pub frame_len: usize,
    pub hop_len: usize,
    pub num_samples: usize,
}

impl Spectrogram {
    /// Number of non-negative frequency bins per frame.
    pub fn bins(&self) -> usize {
        self.frame_len / 2 + 1
    }

    /// Magnitudes of the non-negative bins of one frame.
    pub fn frame_magnitudes(&self, frame_idx: usize) -> Vec<f64> {
        self.frames[frame_idx][..self.bins()]
            .iter()
            .map(|c| c.norm())
            .collect()
    }
}

/// Windowed STFT with a Hann analysis window.
///
/// Signals shorter than one frame produce an empty frame list; callers are
/// expected to treat that as "nothing to analyze".
pub fn analyze(samples: &[f32], frame_len: usize, hop_len: usize) -> Spectrogram {
    let n = samples.len();
    let mut frames = Vec::new();

    if n >= frame_len {
        let hann = hann_window(frame_len);
        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(frame_len);

        let num_frames = (n - frame_len) / hop_len + 1;
        for frame_idx in 0..num_frames {
            let start = frame_idx * hop_len;
            let mut buf: Vec<Complex<f64>> = (0..frame_len)
                .map(|i| Complex::new(samples[start + i] as f64 * hann[i], 0.0))
                .collect();
            fft.process(&mut buf);
            frames.push(buf);
        }
    }

    Spectrogram {
        frames,
        frame_len,
        hop_len,
        num_samples: n,
    }
}

/// Inverse STFT with overlap-add, normalized by the squared-window sum.
///
/// Output length equals `spec.num_samples`. Positions not covered by any
/// frame (the partial tail, or everything when the input was shorter than
/// one frame) are taken from `fallback` so callers keep a buffer of the
/// original length without reconstruction artifacts at the boundary.
pub fn synthesize(spec: &Spectrogram, fallback: &[f32]) -> Vec<f32> {
    let n = spec.num_samples;
    let frame_len = spec.frame_len;
    let half = frame_len / 2;

    let mut output = vec![0.0f64; n];
    let mut window_sum = vec![0.0f64; n];

    if !spec.frames.is_empty() {
        let hann = hann_window(frame_len);
        let mut planner = FftPlanner::<f64>::new();
        let ifft = planner.plan_fft_inverse(frame_len);
        let norm = 1.0 / frame_len as f64;

        for (frame_idx, frame) in spec.frames.iter().enumerate() {
            let start = frame_idx * spec.hop_len;

            let mut buf = frame.clone();
            // Conjugate symmetry for a real-valued output signal.
            for k in 1..half {
                buf[frame_len - k] = buf[k].conj();
            }
            ifft.process(&mut buf);

            for i in 0..frame_len {
                if start + i < n {
                    output[start + i] += buf[i].re * norm * hann[i];
                    window_sum[start + i] += hann[i] * hann[i];
                }
            }
        }
    }

    (0..n)
        .map(|i| {
            if window_sum[i] > WINDOW_SUM_FLOOR {
                (output[i] / window_sum[i]) as f32
            } else {
                fallback.get(i).copied().unwrap_or(0.0)
            }
        })
        .collect()
}
