/// In-place cleanup applied to a kept segment's samples before they are
/// placed into the output.
pub trait SegmentEnhancer: Send {
    fn enhance(&self, samples: &mut Vec<f32>, sample_rate: u32);
}
