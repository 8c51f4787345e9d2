//! Analysis defaults shared across the extraction pipeline.

/// STFT analysis frame length in samples.
pub const DEFAULT_FRAME_LEN: usize = 1024;

/// Hop between successive STFT frames in samples.
pub const DEFAULT_HOP_LEN: usize = 256;

/// Number of MFCC coefficients kept per frame (c0 dropped).
pub const MFCC_COEFFS: usize = 13;

/// Number of triangular mel filters in the MFCC front-end.
pub const MEL_BINS: usize = 40;

/// Number of pitch classes in the chroma vector.
pub const CHROMA_BINS: usize = 12;

/// Lowest fundamental frequency considered voiced speech, in Hz.
pub const PITCH_MIN_HZ: f64 = 50.0;

/// Highest fundamental frequency considered voiced speech, in Hz.
pub const PITCH_MAX_HZ: f64 = 500.0;

/// Frame energies below this are treated as digital silence.
pub const SILENCE_FLOOR: f64 = 1e-10;

/// Pre-emphasis coefficient applied before spectral analysis.
pub const PRE_EMPHASIS: f32 = 0.97;
