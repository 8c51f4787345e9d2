use std::time::Instant;

use crate::features::infrastructure::feature_extractor::FeatureExtractor;
use crate::matching::domain::decision::Decision;
use crate::matching::domain::scoring_policy::{PolicyContext, ScoringPolicy};
use crate::matching::domain::similarity_report::SimilarityReport;
use crate::matching::infrastructure::similarity_scorer::SimilarityScorer;
use crate::matching::infrastructure::spectral_balance_policy::SpectralBalancePolicy;
use crate::pipeline::config::EngineConfig;
use crate::pipeline::error::ExtractionError;
use crate::pipeline::pipeline_logger::{LogPipelineLogger, PipelineLogger};
use crate::reconstruction::domain::reconstructor::{Placement, Reconstructor};
use crate::reconstruction::domain::segment_enhancer::SegmentEnhancer;
use crate::segmentation::domain::segmenter::Segmenter;
use crate::segmentation::infrastructure::multi_stage_segmenter::MultiStageSegmenter;
use crate::shared::audio_buffer::AudioBuffer;

/// Per-segment outcome of one extraction run.
#[derive(Debug, Clone)]
pub struct SegmentDiagnostic {
    pub start_time: f64,
    pub end_time: f64,
    /// `None` when the segment was too short or silent to score.
    pub report: Option<SimilarityReport>,
    pub decision: Decision,
}

#[derive(Debug)]
pub struct ExtractionResult {
    pub output: AudioBuffer,
    /// Mean composite score over the kept and attenuated segments, or
    /// zero when every segment was suppressed.
    pub average_confidence: f64,
    pub diagnostics: Vec<SegmentDiagnostic>,
}

/// Orchestrates segmentation, scoring and reconstruction to pull the
/// reference speaker's voice out of a mixed recording.
pub struct ExtractSpeakerUseCase {
    config: EngineConfig,
    segmenter: Box<dyn Segmenter>,
    scorer: SimilarityScorer,
    policy: Option<Box<dyn ScoringPolicy>>,
    enhancer: Option<Box<dyn SegmentEnhancer>>,
    logger: Box<dyn PipelineLogger>,
}

impl ExtractSpeakerUseCase {
    pub fn new(
        config: EngineConfig,
        segmenter: Box<dyn Segmenter>,
        policy: Option<Box<dyn ScoringPolicy>>,
        enhancer: Option<Box<dyn SegmentEnhancer>>,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            config,
            segmenter,
            scorer: SimilarityScorer::new(),
            policy,
            enhancer,
            logger,
        }
    }

    /// Staged segmentation, spectral-balance scoring, no enhancer.
    pub fn with_defaults() -> Self {
        Self::new(
            EngineConfig::default(),
            Box::new(MultiStageSegmenter::default()),
            Some(Box::new(SpectralBalancePolicy::default())),
            None,
            Box::new(LogPipelineLogger),
        )
    }

    pub fn extract(
        &mut self,
        mixed: &AudioBuffer,
        reference: &AudioBuffer,
    ) -> Result<ExtractionResult, ExtractionError> {
        if mixed.is_empty() {
            return Err(ExtractionError::invalid("mixed", "buffer is empty"));
        }
        if mixed.len() < self.config.frame_len {
            return Err(ExtractionError::invalid(
                "mixed",
                format!("buffer is shorter than one {}-sample analysis frame", self.config.frame_len),
            ));
        }
        if reference.is_empty() {
            return Err(ExtractionError::invalid("reference", "buffer is empty"));
        }
        if mixed.sample_rate() != reference.sample_rate() {
            return Err(ExtractionError::invalid(
                "reference",
                format!(
                    "sample rate {} does not match mixed signal rate {}",
                    reference.sample_rate(),
                    mixed.sample_rate()
                ),
            ));
        }

        let extractor = FeatureExtractor::with_frames(
            mixed.sample_rate(),
            self.config.frame_len,
            self.config.hop_len,
        );
        let reference_features = extractor
            .extract(reference.samples())
            .ok_or_else(|| ExtractionError::invalid("reference", "too short or silent"))?;

        let started = Instant::now();
        let segments = self.segmenter.segment(mixed);
        self.logger
            .stage("segmentation", started.elapsed().as_secs_f64() * 1000.0);
        self.logger.metric("segments", segments.len() as f64);
        if segments.is_empty() {
            return Err(ExtractionError::NoSegmentsFound);
        }

        let started = Instant::now();
        let suppress_gain = self.config.reconstruction.suppress_gain;
        let mut placements = Vec::with_capacity(segments.len());
        let mut diagnostics = Vec::with_capacity(segments.len());
        for segment in &segments {
            let range = segment.sample_range(mixed.sample_rate(), mixed.len());
            let samples = &mixed.samples()[range.clone()];

            let (report, decision) = match extractor.extract(samples) {
                Some(features) => {
                    let adjustment = self
                        .policy
                        .as_ref()
                        .map(|p| {
                            p.adjust(&PolicyContext {
                                segment_samples: samples,
                                reference_samples: reference.samples(),
                                sample_rate: mixed.sample_rate(),
                                segment_features: &features,
                                reference_features: &reference_features,
                            })
                        })
                        .unwrap_or(0.0);
                    let report = self.scorer.score(&features, &reference_features, adjustment);
                    let decision =
                        Decision::from_score(report.composite, self.config.keep_threshold);
                    (Some(report), decision)
                }
                None => (None, Decision::Suppress),
            };

            let gain = decision.gain(suppress_gain);

            let mut placed = samples.to_vec();
            if decision != Decision::Suppress {
                if let Some(enhancer) = &self.enhancer {
                    enhancer.enhance(&mut placed, mixed.sample_rate());
                }
            }
            placements.push(Placement {
                start_sample: range.start,
                samples: placed,
                gain,
            });
            diagnostics.push(SegmentDiagnostic {
                start_time: segment.start_time,
                end_time: segment.end_time,
                report,
                decision,
            });
        }
        self.logger
            .stage("scoring", started.elapsed().as_secs_f64() * 1000.0);

        let started = Instant::now();
        let reconstructor = Reconstructor::new(self.config.reconstruction.clone());
        let output = reconstructor.reconstruct(mixed, &placements);
        self.logger
            .stage("reconstruction", started.elapsed().as_secs_f64() * 1000.0);

        let retained: Vec<f64> = diagnostics
            .iter()
            .filter(|d| d.decision != Decision::Suppress)
            .filter_map(|d| d.report.as_ref().map(|r| r.composite))
            .collect();
        let average_confidence = if retained.is_empty() {
            0.0
        } else {
            retained.iter().sum::<f64>() / retained.len() as f64
        };
        self.logger.metric("average_confidence", average_confidence);

        Ok(ExtractionResult {
            output,
            average_confidence,
            diagnostics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use crate::shared::audio_buffer::rms_of;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    const SAMPLE_RATE: u32 = 16000;

    fn tone(freq: f64, duration: f64, amplitude: f64) -> Vec<f32> {
        let len = (duration * SAMPLE_RATE as f64) as usize;
        (0..len)
            .map(|i| {
                let t = i as f64 / SAMPLE_RATE as f64;
                (amplitude * (2.0 * PI * freq * t).sin()) as f32
            })
            .collect()
    }

    fn silence(duration: f64) -> Vec<f32> {
        vec![0.0f32; (duration * SAMPLE_RATE as f64) as usize]
    }

    fn use_case() -> ExtractSpeakerUseCase {
        ExtractSpeakerUseCase::new(
            EngineConfig::default(),
            Box::new(MultiStageSegmenter::default()),
            Some(Box::new(SpectralBalancePolicy::default())),
            None,
            Box::new(NullPipelineLogger),
        )
    }

    #[test]
    fn test_interference_suppressed_and_target_preserved() {
        // Two 200 Hz spans matching the reference bracket a 100 Hz
        // interference span, separated by silence.
        let reference = AudioBuffer::new(tone(200.0, 1.0, 0.9), SAMPLE_RATE);
        let mut samples = tone(200.0, 0.7, 0.9);
        samples.extend(silence(0.5));
        let interference_start = samples.len();
        samples.extend(tone(100.0, 0.7, 0.9));
        let interference_end = samples.len();
        samples.extend(silence(0.5));
        samples.extend(tone(200.0, 0.7, 0.9));
        let mixed = AudioBuffer::new(samples, SAMPLE_RATE);

        let result = use_case().extract(&mixed, &reference).unwrap();
        assert_eq!(result.output.len(), mixed.len());

        // Interference drops to a residual level.
        let in_rms = rms_of(&mixed.samples()[interference_start..interference_end]);
        let out_rms = rms_of(&result.output.samples()[interference_start..interference_end]);
        assert!(out_rms < 0.1 * in_rms, "interference rms {out_rms}");

        // Target spans keep their level. Skip a frame at the edges where
        // segment boundaries are quantized.
        let margin = 1600;
        let span = &result.output.samples()[margin..interference_start - 8000 - margin];
        let original = &mixed.samples()[margin..interference_start - 8000 - margin];
        assert_relative_eq!(rms_of(span), rms_of(original), max_relative = 0.05);

        // Confidence averages over the two kept spans only.
        assert!(result.average_confidence > 0.9);
    }

    #[test]
    fn test_interference_decision_is_suppress() {
        let reference = AudioBuffer::new(tone(200.0, 1.0, 0.9), SAMPLE_RATE);
        let mut samples = tone(200.0, 0.7, 0.9);
        samples.extend(silence(0.5));
        samples.extend(tone(100.0, 0.7, 0.9));
        samples.extend(silence(0.5));
        samples.extend(tone(200.0, 0.7, 0.9));
        let mixed = AudioBuffer::new(samples, SAMPLE_RATE);

        let result = use_case().extract(&mixed, &reference).unwrap();
        assert_eq!(result.diagnostics.len(), 3);
        assert_eq!(result.diagnostics[0].decision, Decision::Keep);
        assert_eq!(result.diagnostics[1].decision, Decision::Suppress);
        assert_eq!(result.diagnostics[2].decision, Decision::Keep);
    }

    #[test]
    fn test_silent_mixed_signal_reports_no_segments() {
        let reference = AudioBuffer::new(tone(200.0, 1.0, 0.9), SAMPLE_RATE);
        let mixed = AudioBuffer::new(silence(2.0), SAMPLE_RATE);
        let err = use_case().extract(&mixed, &reference).unwrap_err();
        assert!(matches!(err, ExtractionError::NoSegmentsFound));
    }

    #[test]
    fn test_reference_identical_to_mixed_is_kept_whole() {
        let samples = tone(200.0, 2.0, 0.9);
        let mixed = AudioBuffer::new(samples.clone(), SAMPLE_RATE);
        let reference = AudioBuffer::new(samples, SAMPLE_RATE);

        let result = use_case().extract(&mixed, &reference).unwrap();
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].decision, Decision::Keep);
        assert_relative_eq!(result.output.rms(), mixed.rms(), max_relative = 0.02);
        assert!(result.average_confidence > 0.9);
    }

    #[test]
    fn test_empty_inputs_are_rejected() {
        let empty = AudioBuffer::new(Vec::new(), SAMPLE_RATE);
        let tone_buf = AudioBuffer::new(tone(200.0, 1.0, 0.9), SAMPLE_RATE);

        let err = use_case().extract(&empty, &tone_buf).unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::InvalidAudio { which: "mixed", .. }
        ));

        let err = use_case().extract(&tone_buf, &empty).unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::InvalidAudio {
                which: "reference",
                ..
            }
        ));
    }

    #[test]
    fn test_sub_frame_mixed_buffer_is_rejected() {
        let mixed = AudioBuffer::new(tone(200.0, 0.01, 0.9), SAMPLE_RATE);
        let reference = AudioBuffer::new(tone(200.0, 1.0, 0.9), SAMPLE_RATE);
        let err = use_case().extract(&mixed, &reference).unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::InvalidAudio { which: "mixed", .. }
        ));
    }

    #[test]
    fn test_sample_rate_mismatch_is_rejected() {
        let mixed = AudioBuffer::new(tone(200.0, 1.0, 0.9), SAMPLE_RATE);
        let reference = AudioBuffer::new(tone(200.0, 1.0, 0.9), 8000);
        let err = use_case().extract(&mixed, &reference).unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::InvalidAudio {
                which: "reference",
                ..
            }
        ));
    }

    #[test]
    fn test_silent_reference_is_rejected() {
        let mixed = AudioBuffer::new(tone(200.0, 1.0, 0.9), SAMPLE_RATE);
        let reference = AudioBuffer::new(silence(1.0), SAMPLE_RATE);
        let err = use_case().extract(&mixed, &reference).unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::InvalidAudio {
                which: "reference",
                ..
            }
        ));
    }
}
