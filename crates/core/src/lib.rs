//! Reference-driven target-speaker extraction.
//!
//! Given a mixed recording and a clean reference sample of one speaker,
//! the pipeline segments the mix into speech-like spans, scores each
//! span's acoustic similarity to the reference, and rebuilds a signal
//! that keeps the reference speaker and suppresses everything else.
//!
//! Each bounded context splits into a `domain` layer (types and trait
//! seams) and an `infrastructure` layer (concrete implementations).
//! The `pipeline` module ties them together; start with
//! [`pipeline::extract_speaker_use_case::ExtractSpeakerUseCase`].

pub mod features;
pub mod matching;
pub mod pipeline;
pub mod reconstruction;
pub mod segmentation;
pub mod shared;
pub mod signal;
