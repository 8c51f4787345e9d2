use crate::features::domain::feature_vector::FeatureVector;

/// Everything a scoring policy may inspect when adjusting a score.
pub struct PolicyContext<'a> {
    pub segment_samples: &'a [f32],
    pub reference_samples: &'a [f32],
    pub sample_rate: u32,
    pub segment_features: &'a FeatureVector,
    pub reference_features: &'a FeatureVector,
}

/// Domain-specific correction applied on top of the metric composite.
///
/// The returned value is added to the weighted composite before
/// clamping, so negative values penalize and positive values reward.
pub trait ScoringPolicy: Send {
    fn adjust(&self, ctx: &PolicyContext) -> f64;
}
