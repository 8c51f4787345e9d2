use std::ops::Range;

/// One speech-like span of the mixed signal, in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub start_time: f64,
    pub end_time: f64,
    /// Root-mean-square level of the span's samples.
    pub energy: f64,
}

impl Segment {
    pub fn new(start_time: f64, end_time: f64, energy: f64) -> Self {
        Self {
            start_time,
            end_time,
            energy,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Sample index range of this span, clamped to `num_samples`.
    pub fn sample_range(&self, sample_rate: u32, num_samples: usize) -> Range<usize> {
        let start = ((self.start_time * sample_rate as f64) as usize).min(num_samples);
        let end = ((self.end_time * sample_rate as f64).ceil() as usize).min(num_samples);
        start..end.max(start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_duration() {
        let seg = Segment::new(1.0, 2.5, 0.1);
        assert_relative_eq!(seg.duration(), 1.5);
    }

    #[test]
    fn test_sample_range_is_clamped() {
        let seg = Segment::new(0.5, 3.0, 0.1);
        let range = seg.sample_range(16000, 16000);
        assert_eq!(range, 8000..16000);
    }

    #[test]
    fn test_sample_range_past_end_is_empty() {
        let seg = Segment::new(3.0, 4.0, 0.1);
        let range = seg.sample_range(16000, 16000);
        assert!(range.is_empty());
    }
}
