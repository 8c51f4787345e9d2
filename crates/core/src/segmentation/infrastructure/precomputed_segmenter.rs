use crate::segmentation::domain::segment::Segment;
use crate::segmentation::domain::segmenter::Segmenter;
use crate::shared::audio_buffer::{rms_of, AudioBuffer};

/// Segmenter backed by caller-supplied boundaries.
///
/// Spans are clamped to the buffer, invalid or empty spans are dropped,
/// overlapping spans are truncated against their predecessor so the
/// result is disjoint, and energies are recomputed from the actual
/// samples.
pub struct PrecomputedSegmenter {
    spans: Vec<(f64, f64)>,
}

impl PrecomputedSegmenter {
    pub fn new(spans: Vec<(f64, f64)>) -> Self {
        Self { spans }
    }
}

impl Segmenter for PrecomputedSegmenter {
    fn segment(&self, audio: &AudioBuffer) -> Vec<Segment> {
        let duration = audio.duration();
        let mut spans: Vec<(f64, f64)> = self
            .spans
            .iter()
            .filter_map(|&(start, end)| {
                let start = start.max(0.0);
                let end = end.min(duration);
                (end > start).then_some((start, end))
            })
            .collect();
        spans.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut segments: Vec<Segment> = Vec::new();
        let mut cursor = 0.0f64;
        for (start, end) in spans {
            let start = start.max(cursor);
            if end <= start {
                continue;
            }
            let range = Segment::new(start, end, 0.0)
                .sample_range(audio.sample_rate(), audio.samples().len());
            if range.is_empty() {
                continue;
            }
            let energy = rms_of(&audio.samples()[range]);
            segments.push(Segment::new(start, end, energy));
            cursor = end;
        }
        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spans_are_clamped_sorted_and_validated() {
        let audio = AudioBuffer::new(vec![0.5f32; 16000], 16000);
        let segmenter = PrecomputedSegmenter::new(vec![
            (0.8, 5.0),
            (-1.0, 0.3),
            (0.5, 0.5),
            (2.0, 3.0),
        ]);
        let segments = segmenter.segment(&audio);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].start_time, 0.0);
        assert_eq!(segments[0].end_time, 0.3);
        assert_eq!(segments[1].start_time, 0.8);
        assert_eq!(segments[1].end_time, 1.0);
        assert!(segments.iter().all(|s| s.energy > 0.0));
    }

    #[test]
    fn test_overlapping_spans_become_disjoint() {
        let audio = AudioBuffer::new(vec![0.5f32; 16000], 16000);
        let segmenter = PrecomputedSegmenter::new(vec![(0.4, 0.9), (0.2, 0.6)]);
        let segments = segmenter.segment(&audio);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].start_time, 0.2);
        assert_eq!(segments[0].end_time, 0.6);
        assert_eq!(segments[1].start_time, 0.6);
        assert_eq!(segments[1].end_time, 0.9);
    }

    #[test]
    fn test_contained_span_is_swallowed() {
        let audio = AudioBuffer::new(vec![0.5f32; 16000], 16000);
        let segmenter = PrecomputedSegmenter::new(vec![(0.1, 0.8), (0.3, 0.5)]);
        let segments = segmenter.segment(&audio);

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start_time, 0.1);
        assert_eq!(segments[0].end_time, 0.8);
    }
}
