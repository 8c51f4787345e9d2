/// One similarity metric's contribution to the composite score.
#[derive(Debug, Clone)]
pub struct MetricScore {
    pub name: &'static str,
    /// Similarity in [0, 1].
    pub score: f64,
    pub weight: f64,
}

/// Scored comparison between a segment and the reference speaker.
#[derive(Debug, Clone)]
pub struct SimilarityReport {
    pub metrics: Vec<MetricScore>,
    /// Additive adjustment from an installed scoring policy.
    pub policy_adjustment: f64,
    /// Final score in [0, 1], weighted over the metrics that could be
    /// computed plus the policy adjustment.
    pub composite: f64,
}

impl SimilarityReport {
    pub fn new(metrics: Vec<MetricScore>, policy_adjustment: f64) -> Self {
        let composite = (weighted_composite(&metrics) + policy_adjustment).clamp(0.0, 1.0);
        Self {
            metrics,
            policy_adjustment,
            composite,
        }
    }
}

/// Weighted mean of the present metrics.
///
/// Weights are renormalized over whatever metrics are present, so a
/// missing metric (an unvoiced segment's pitch, say) redistributes its
/// weight instead of dragging the score down.
pub fn weighted_composite(metrics: &[MetricScore]) -> f64 {
    let total_weight: f64 = metrics.iter().map(|m| m.weight).sum();
    if total_weight <= 0.0 {
        return 0.0;
    }
    metrics.iter().map(|m| m.weight * m.score).sum::<f64>() / total_weight
}
