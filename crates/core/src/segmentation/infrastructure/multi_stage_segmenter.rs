use log::debug;
use ndarray::Axis;

use crate::features::infrastructure::feature_extractor::FeatureExtractor;
use crate::features::infrastructure::pitch;
use crate::segmentation::domain::segment::Segment;
use crate::segmentation::domain::segmenter::Segmenter;
use crate::shared::audio_buffer::{rms_of, AudioBuffer};
use crate::shared::constants::{DEFAULT_FRAME_LEN, DEFAULT_HOP_LEN, SILENCE_FLOOR};
use crate::shared::math;

/// Tuning for the staged segmentation passes, all durations in seconds.
#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    pub energy_frame: f64,
    pub energy_hop: f64,
    pub volume_window: f64,
    pub volume_hop: f64,
    pub spectral_window: f64,
    pub spectral_hop: f64,
    /// MFCC cosine distance above which adjacent windows indicate a
    /// speaker change.
    pub spectral_change_threshold: f64,
    /// Combined timbre, pitch and level similarity above which adjacent
    /// segments merge.
    pub merge_threshold: f64,
    /// Segments further apart than this never merge.
    pub max_merge_gap: f64,
    pub min_segment_duration: f64,
    /// Shortest silence-gap span considered for supplementation.
    pub gap_min_duration: f64,
    /// Gap spans louder than this fraction of the global RMS are kept.
    pub gap_rms_ratio: f64,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            energy_frame: 0.020,
            energy_hop: 0.005,
            volume_window: 0.200,
            volume_hop: 0.050,
            spectral_window: 0.500,
            spectral_hop: 0.100,
            spectral_change_threshold: 0.25,
            merge_threshold: 0.55,
            max_merge_gap: 0.3,
            min_segment_duration: 0.2,
            gap_min_duration: 0.1,
            gap_rms_ratio: 0.1,
        }
    }
}

/// Energy-gated segmentation refined by volume and spectral change, then
/// cleaned up by merging, a minimum-duration filter and a gap pass that
/// recovers quiet speech the energy gate missed.
pub struct MultiStageSegmenter {
    config: SegmenterConfig,
}

impl MultiStageSegmenter {
    pub fn new(config: SegmenterConfig) -> Self {
        Self { config }
    }

    fn energy_pass(&self, audio: &AudioBuffer) -> Vec<(f64, f64)> {
        let sr = audio.sample_rate() as f64;
        let samples = audio.samples();
        let frame = ((self.config.energy_frame * sr) as usize).max(1);
        let hop = ((self.config.energy_hop * sr) as usize).max(1);
        if samples.len() < frame {
            return Vec::new();
        }

        let num_frames = (samples.len() - frame) / hop + 1;
        let energies: Vec<f64> = (0..num_frames)
            .map(|i| rms_of(&samples[i * hop..i * hop + frame]))
            .collect();

        let mean = energies.iter().sum::<f64>() / energies.len() as f64;
        let threshold = math::percentile(&energies, 15.0)
            .max(0.05 * mean)
            .max(SILENCE_FLOOR);

        let mut spans = Vec::new();
        let mut run_start: Option<usize> = None;
        for (i, &e) in energies.iter().enumerate() {
            if e >= threshold {
                run_start.get_or_insert(i);
            } else if let Some(start) = run_start.take() {
                spans.push(frame_span(start, i - 1, frame, hop, sr, audio.duration()));
            }
        }
        if let Some(start) = run_start {
            spans.push(frame_span(
                start,
                num_frames - 1,
                frame,
                hop,
                sr,
                audio.duration(),
            ));
        }
        spans
    }

    fn refine_by_volume(&self, audio: &AudioBuffer, spans: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
        let sr = audio.sample_rate() as f64;
        let window = ((self.config.volume_window * sr) as usize).max(1);
        let hop = ((self.config.volume_hop * sr) as usize).max(1);

        let mut refined = Vec::new();
        for (start, end) in spans {
            let samples = &audio.samples()[span_samples(audio, start, end)];
            if samples.len() < 2 * window {
                refined.push((start, end));
                continue;
            }

            let num_windows = (samples.len() - window) / hop + 1;
            let levels: Vec<f64> = (0..num_windows)
                .map(|i| rms_of(&samples[i * hop..i * hop + window]))
                .collect();
            let diffs: Vec<f64> = levels.windows(2).map(|w| w[1] - w[0]).collect();

            let mean_diff = diffs.iter().sum::<f64>() / diffs.len() as f64;
            let var = diffs.iter().map(|d| (d - mean_diff).powi(2)).sum::<f64>()
                / diffs.len() as f64;
            let sigma = var.sqrt();
            let peak = levels.iter().copied().fold(0.0f64, f64::max);
            let abs_guard = 0.05 * peak;

            let mut cut = start;
            for (i, &d) in diffs.iter().enumerate() {
                let outlier = (d - mean_diff).abs() > 3.0 * sigma && d.abs() > abs_guard;
                if outlier {
                    let split = start + ((i + 1) * hop) as f64 / sr;
                    if split > cut {
                        refined.push((cut, split));
                        cut = split;
                    }
                }
            }
            if end > cut {
                refined.push((cut, end));
            }
        }
        refined.retain(|&(start, end)| end - start >= self.config.min_segment_duration);
        refined
    }

    fn refine_by_spectrum(&self, audio: &AudioBuffer, spans: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
        let sr = audio.sample_rate() as f64;
        let window = ((self.config.spectral_window * sr) as usize).max(1);
        let hop = ((self.config.spectral_hop * sr) as usize).max(1);
        let extractor = FeatureExtractor::new(audio.sample_rate());

        let mut refined = Vec::new();
        for (start, end) in spans {
            let samples = &audio.samples()[span_samples(audio, start, end)];
            if samples.len() < 2 * window {
                refined.push((start, end));
                continue;
            }

            let num_windows = (samples.len() - window) / hop + 1;
            let profiles: Vec<Option<Vec<f64>>> = (0..num_windows)
                .map(|i| mfcc_mean(&extractor, &samples[i * hop..i * hop + window]))
                .collect();

            let mut cut = start;
            for i in 0..num_windows - 1 {
                let changed = match (&profiles[i], &profiles[i + 1]) {
                    (Some(a), Some(b)) => {
                        1.0 - math::cosine_similarity(a, b) > self.config.spectral_change_threshold
                    }
                    _ => false,
                };
                if changed {
                    let split = start + ((i + 1) * hop) as f64 / sr;
                    if split > cut {
                        refined.push((cut, split));
                        cut = split;
                    }
                }
            }
            if end > cut {
                refined.push((cut, end));
            }
        }
        refined.retain(|&(start, end)| end - start >= self.config.min_segment_duration);
        refined
    }

    fn merge_similar(&self, audio: &AudioBuffer, spans: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
        let extractor = FeatureExtractor::new(audio.sample_rate());

        let mut merged: Vec<(f64, f64)> = Vec::new();
        for span in spans {
            let Some(last) = merged.last_mut() else {
                merged.push(span);
                continue;
            };
            let gap = span.0 - last.1;
            if gap > self.config.max_merge_gap {
                merged.push(span);
                continue;
            }
            // Spans too short to profile are fragments of their neighbor.
            let similar = self
                .merge_similarity(audio, &extractor, *last, span)
                .map_or(true, |s| s > self.config.merge_threshold);
            if similar {
                last.1 = span.1;
            } else {
                merged.push(span);
            }
        }
        merged
    }

    /// Equal-weight mean of timbre, pitch and level similarity between
    /// two spans. `None` when no metric is computable for the pair.
    fn merge_similarity(
        &self,
        audio: &AudioBuffer,
        extractor: &FeatureExtractor,
        a: (f64, f64),
        b: (f64, f64),
    ) -> Option<f64> {
        let samples_a = &audio.samples()[span_samples(audio, a.0, a.1)];
        let samples_b = &audio.samples()[span_samples(audio, b.0, b.1)];

        let mut terms = Vec::with_capacity(3);
        if let (Some(ma), Some(mb)) = (
            mfcc_mean(extractor, samples_a),
            mfcc_mean(extractor, samples_b),
        ) {
            terms.push(math::cosine_similarity(&ma, &mb).max(0.0));
        }
        if let (Some(pa), Some(pb)) = (
            mean_pitch(samples_a, audio.sample_rate()),
            mean_pitch(samples_b, audio.sample_rate()),
        ) {
            terms.push(pa.min(pb) / pa.max(pb));
        }
        let (rms_a, rms_b) = (rms_of(samples_a), rms_of(samples_b));
        if rms_a > 0.0 && rms_b > 0.0 {
            terms.push(rms_a.min(rms_b) / rms_a.max(rms_b));
        }

        if terms.is_empty() {
            return None;
        }
        Some(terms.iter().sum::<f64>() / terms.len() as f64)
    }

    fn supplement_gaps(&self, audio: &AudioBuffer, spans: &[(f64, f64)]) -> Vec<(f64, f64)> {
        let global_rms = audio.rms();
        let mut gaps = Vec::new();
        let mut cursor = 0.0;
        for &(start, end) in spans {
            if start > cursor {
                gaps.push((cursor, start));
            }
            cursor = cursor.max(end);
        }
        if audio.duration() > cursor {
            gaps.push((cursor, audio.duration()));
        }

        gaps.into_iter()
            .filter(|&(start, end)| {
                if end - start < self.config.gap_min_duration {
                    return false;
                }
                let range = span_samples(audio, start, end);
                !range.is_empty()
                    && rms_of(&audio.samples()[range]) > self.config.gap_rms_ratio * global_rms
            })
            .collect()
    }
}

impl Default for MultiStageSegmenter {
    fn default() -> Self {
        Self::new(SegmenterConfig::default())
    }
}

impl Segmenter for MultiStageSegmenter {
    fn segment(&self, audio: &AudioBuffer) -> Vec<Segment> {
        if audio.is_empty() {
            return Vec::new();
        }

        let coarse = self.energy_pass(audio);
        debug!("energy pass found {} spans", coarse.len());
        let refined = self.refine_by_volume(audio, coarse);
        let refined = self.refine_by_spectrum(audio, refined);
        let merged = self.merge_similar(audio, refined);
        debug!("{} spans after refinement and merging", merged.len());

        let mut kept: Vec<(f64, f64)> = merged
            .into_iter()
            .filter(|&(start, end)| end - start >= self.config.min_segment_duration)
            .collect();
        let supplemented = self.supplement_gaps(audio, &kept);
        debug!("{} quiet spans recovered from gaps", supplemented.len());
        kept.extend(supplemented);
        kept.sort_by(|a, b| a.0.total_cmp(&b.0));

        kept.into_iter()
            .filter_map(|(start, end)| {
                let range = span_samples(audio, start, end);
                if range.is_empty() {
                    return None;
                }
                let energy = rms_of(&audio.samples()[range]);
                Some(Segment::new(start, end, energy))
            })
            .collect()
    }
}

fn frame_span(
    first: usize,
    last: usize,
    frame: usize,
    hop: usize,
    sr: f64,
    duration: f64,
) -> (f64, f64) {
    let start = (first * hop) as f64 / sr;
    let end = ((last * hop + frame) as f64 / sr).min(duration);
    (start, end)
}

fn span_samples(audio: &AudioBuffer, start: f64, end: f64) -> std::ops::Range<usize> {
    Segment::new(start, end, 0.0).sample_range(audio.sample_rate(), audio.samples().len())
}

fn mfcc_mean(extractor: &FeatureExtractor, samples: &[f32]) -> Option<Vec<f64>> {
    let frames = extractor.mfcc_frames(samples)?;
    Some(frames.mean_axis(Axis(0))?.to_vec())
}

fn mean_pitch(samples: &[f32], sample_rate: u32) -> Option<f64> {
    let frames =
        pitch::detect_pitch_frames(samples, sample_rate, DEFAULT_FRAME_LEN, DEFAULT_HOP_LEN);
    let voiced: Vec<f64> = frames.into_iter().flatten().collect();
    if voiced.is_empty() {
        return None;
    }
    Some(voiced.iter().sum::<f64>() / voiced.len() as f64)
}
