use crate::reconstruction::domain::reconstructor::ReconstructionConfig;
use crate::segmentation::infrastructure::multi_stage_segmenter::SegmenterConfig;
use crate::shared::constants::{DEFAULT_FRAME_LEN, DEFAULT_HOP_LEN};

/// Composite score at or above which a segment is kept verbatim.
pub const DEFAULT_KEEP_THRESHOLD: f64 = 0.70;

/// Top-level tuning for the extraction pipeline.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub frame_len: usize,
    pub hop_len: usize,
    pub keep_threshold: f64,
    pub segmenter: SegmenterConfig,
    pub reconstruction: ReconstructionConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frame_len: DEFAULT_FRAME_LEN,
            hop_len: DEFAULT_HOP_LEN,
            keep_threshold: DEFAULT_KEEP_THRESHOLD,
            segmenter: SegmenterConfig::default(),
            reconstruction: ReconstructionConfig::default(),
        }
    }
}
