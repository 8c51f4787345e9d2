pub mod reconstructor;
pub mod segment_enhancer;
