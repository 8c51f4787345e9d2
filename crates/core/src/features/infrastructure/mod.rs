pub mod feature_extractor;
pub mod mel;
pub mod pitch;
