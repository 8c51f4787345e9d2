use crate::features::domain::feature_vector::FeatureVector;
use crate::matching::domain::similarity_report::{MetricScore, SimilarityReport};
use crate::shared::math;

pub const WEIGHT_MFCC: f64 = 0.35;
pub const WEIGHT_PITCH: f64 = 0.30;
pub const WEIGHT_CENTROID: f64 = 0.10;
pub const WEIGHT_BANDWIDTH: f64 = 0.05;
pub const WEIGHT_ROLLOFF: f64 = 0.10;
pub const WEIGHT_CHROMA: f64 = 0.10;

/// Decay constants, in Hz, for the spectral-shape distance metrics.
const CENTROID_SCALE: f64 = 250.0;
const BANDWIDTH_SCALE: f64 = 400.0;
const ROLLOFF_SCALE: f64 = 600.0;

/// Weighted multi-metric comparison of segment features against the
/// reference speaker's features.
///
/// The pitch metric is skipped when either side has no voiced frames;
/// its weight is redistributed over the remaining metrics.
#[derive(Default)]
pub struct SimilarityScorer;

impl SimilarityScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score(
        &self,
        segment: &FeatureVector,
        reference: &FeatureVector,
        policy_adjustment: f64,
    ) -> SimilarityReport {
        let mut metrics = Vec::with_capacity(6);

        metrics.push(MetricScore {
            name: "mfcc",
            score: math::cosine_similarity(&segment.mfcc_mean, &reference.mfcc_mean).max(0.0),
            weight: WEIGHT_MFCC,
        });

        if segment.has_pitch() && reference.has_pitch() {
            let lo = segment.pitch_mean.min(reference.pitch_mean);
            let hi = segment.pitch_mean.max(reference.pitch_mean);
            metrics.push(MetricScore {
                name: "pitch",
                score: lo / hi,
                weight: WEIGHT_PITCH,
            });
        }

        metrics.push(MetricScore {
            name: "centroid",
            score: decay(segment.spectral_centroid, reference.spectral_centroid, CENTROID_SCALE),
            weight: WEIGHT_CENTROID,
        });
        metrics.push(MetricScore {
            name: "bandwidth",
            score: decay(
                segment.spectral_bandwidth,
                reference.spectral_bandwidth,
                BANDWIDTH_SCALE,
            ),
            weight: WEIGHT_BANDWIDTH,
        });
        metrics.push(MetricScore {
            name: "rolloff",
            score: decay(segment.spectral_rolloff, reference.spectral_rolloff, ROLLOFF_SCALE),
            weight: WEIGHT_ROLLOFF,
        });

        metrics.push(MetricScore {
            name: "chroma",
            score: math::cosine_similarity(&segment.chroma, &reference.chroma).max(0.0),
            weight: WEIGHT_CHROMA,
        });

        SimilarityReport::new(metrics, policy_adjustment)
    }
}

fn decay(a: f64, b: f64, scale: f64) -> f64 {
    (-(a - b).abs() / scale).exp()
}
