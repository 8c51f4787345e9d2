pub mod multi_stage_segmenter;
pub mod precomputed_segmenter;
