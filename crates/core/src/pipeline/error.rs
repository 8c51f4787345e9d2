use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    /// An input buffer cannot be processed. `which` names the buffer.
    #[error("invalid {which} audio: {reason}")]
    InvalidAudio {
        which: &'static str,
        reason: String,
    },

    /// Segmentation found nothing speech-like in the mixed signal.
    #[error("no speech-like segments found in the mixed signal")]
    NoSegmentsFound,
}

impl ExtractionError {
    pub fn invalid(which: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidAudio {
            which,
            reason: reason.into(),
        }
    }
}
