/// A buffer of decoded mono audio: PCM samples normalized to [-1.0, 1.0].
///
/// Every buffer in one pipeline run carries the same sample rate; decoding
/// and resampling happen upstream of this crate.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    pub fn sample_index_at_time(&self, time: f64) -> usize {
        (time * self.sample_rate as f64) as usize
    }

    /// Root-mean-square energy of the whole buffer (0.0 when empty).
    pub fn rms(&self) -> f64 {
        rms_of(&self.samples)
    }
}

/// RMS of a raw sample slice.
pub fn rms_of(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = samples.iter().map(|&s| s as f64 * s as f64).sum();
    (sum_sq / samples.len() as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_creates_buffer_with_correct_fields() {
        let samples = vec![0.0f32; 16000];
        let buf = AudioBuffer::new(samples.clone(), 16000);
        assert_eq!(buf.samples(), &samples[..]);
        assert_eq!(buf.sample_rate(), 16000);
        assert_eq!(buf.len(), 16000);
    }

    #[test]
    fn test_duration() {
        let buf = AudioBuffer::new(vec![0.0; 48000], 16000);
        assert_eq!(buf.duration(), 3.0);
    }

    #[test]
    fn test_sample_index_at_time() {
        let buf = AudioBuffer::new(vec![0.0; 16000], 16000);
        assert_eq!(buf.sample_index_at_time(0.5), 8000);
    }

    #[test]
    fn test_rms_of_constant_signal() {
        let buf = AudioBuffer::new(vec![0.5; 1000], 16000);
        assert_relative_eq!(buf.rms(), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_rms_of_empty_is_zero() {
        assert_eq!(rms_of(&[]), 0.0);
    }
}
