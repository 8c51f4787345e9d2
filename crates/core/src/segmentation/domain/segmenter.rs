use crate::segmentation::domain::segment::Segment;
use crate::shared::audio_buffer::AudioBuffer;

/// Splits a mixed recording into candidate speech spans.
///
/// Implementations must return non-overlapping segments sorted by start
/// time, each with positive duration inside the buffer's bounds.
pub trait Segmenter: Send {
    fn segment(&self, audio: &AudioBuffer) -> Vec<Segment>;
}
