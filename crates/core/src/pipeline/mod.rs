pub mod config;
pub mod error;
pub mod extract_speaker_use_case;
pub mod match_candidates_use_case;
pub mod pipeline_logger;
