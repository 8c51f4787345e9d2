use log::warn;

use crate::features::infrastructure::feature_extractor::FeatureExtractor;
use crate::matching::domain::scoring_policy::{PolicyContext, ScoringPolicy};
use crate::matching::domain::similarity_report::SimilarityReport;
use crate::matching::infrastructure::similarity_scorer::SimilarityScorer;
use crate::pipeline::error::ExtractionError;
use crate::shared::audio_buffer::AudioBuffer;

/// One candidate recording's similarity to the reference speaker.
#[derive(Debug, Clone)]
pub struct CandidateMatch {
    /// Index into the candidate list passed to [`MatchCandidatesUseCase::rank`].
    pub index: usize,
    pub report: SimilarityReport,
}

/// Ranks whole recordings by how closely they match a reference
/// speaker, most similar first. Candidates too short or silent to
/// analyze are left out of the ranking.
pub struct MatchCandidatesUseCase {
    scorer: SimilarityScorer,
    policy: Option<Box<dyn ScoringPolicy>>,
}

impl MatchCandidatesUseCase {
    pub fn new(policy: Option<Box<dyn ScoringPolicy>>) -> Self {
        Self {
            scorer: SimilarityScorer::new(),
            policy,
        }
    }

    pub fn rank(
        &self,
        candidates: &[AudioBuffer],
        reference: &AudioBuffer,
    ) -> Result<Vec<CandidateMatch>, ExtractionError> {
        if reference.is_empty() {
            return Err(ExtractionError::invalid("reference", "buffer is empty"));
        }
        let extractor = FeatureExtractor::new(reference.sample_rate());
        let reference_features = extractor
            .extract(reference.samples())
            .ok_or_else(|| ExtractionError::invalid("reference", "too short or silent"))?;

        let mut matches = Vec::new();
        for (index, candidate) in candidates.iter().enumerate() {
            if candidate.sample_rate() != reference.sample_rate() {
                return Err(ExtractionError::invalid(
                    "candidate",
                    format!(
                        "sample rate {} does not match reference rate {}",
                        candidate.sample_rate(),
                        reference.sample_rate()
                    ),
                ));
            }
            let Some(features) = extractor.extract(candidate.samples()) else {
                warn!("candidate {index} is too short or silent to analyze, skipping");
                continue;
            };
            let adjustment = self
                .policy
                .as_ref()
                .map(|p| {
                    p.adjust(&PolicyContext {
                        segment_samples: candidate.samples(),
                        reference_samples: reference.samples(),
                        sample_rate: reference.sample_rate(),
                        segment_features: &features,
                        reference_features: &reference_features,
                    })
                })
                .unwrap_or(0.0);
            let report = self.scorer.score(&features, &reference_features, adjustment);
            matches.push(CandidateMatch { index, report });
        }

        matches.sort_by(|a, b| b.report.composite.total_cmp(&a.report.composite));
        Ok(matches)
    }
}
