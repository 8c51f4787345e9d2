/// Fraction of the keep threshold below which a segment is suppressed
/// outright instead of attenuated.
pub const ATTENUATE_FRACTION: f64 = 0.7;

/// Outcome of scoring one segment against the reference speaker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    Keep,
    /// Kept at reduced level; the weight is the segment's composite.
    Attenuate(f64),
    Suppress,
}

impl Decision {
    /// Classify a composite score against the keep threshold.
    pub fn from_score(composite: f64, keep_threshold: f64) -> Self {
        if composite >= keep_threshold {
            Decision::Keep
        } else if composite >= ATTENUATE_FRACTION * keep_threshold {
            Decision::Attenuate(composite)
        } else {
            Decision::Suppress
        }
    }

    /// Blending gain for a segment with this decision.
    ///
    /// Attenuated segments are weighted by their own score, so a near
    /// miss stays mostly audible and a marginal match fades.
    pub fn gain(&self, suppress_gain: f64) -> f64 {
        match self {
            Decision::Keep => 1.0,
            Decision::Attenuate(weight) => weight.clamp(0.0, 1.0),
            Decision::Suppress => suppress_gain,
        }
    }
}
