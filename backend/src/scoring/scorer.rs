use image::RgbImage;
use shared::{AnalysisResponse, MediaKind};
use std::sync::Arc;

use super::classifier::Classifier;
use super::entropy;
use crate::config::ScoringConfig;
use crate::error::AnalysisError;
use crate::media;

/// Scores averaged over the leading frames of a video.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameScores {
    pub scores: Vec<f32>,
    pub mean: f32,
}

/// Immutable handle over the loaded classifier and its scoring parameters.
/// Constructed once at startup and shared read-only by every request.
#[derive(Clone)]
pub struct Scorer {
    classifier: Arc<dyn Classifier>,
    config: Arc<ScoringConfig>,
}

impl Scorer {
    pub fn new(classifier: Arc<dyn Classifier>, config: ScoringConfig) -> Self {
        Self {
            classifier,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Fakeness score in [0, 1] for a single RGB image.
    pub fn score(&self, image: &RgbImage) -> Result<f32, AnalysisError> {
        let logits = self.classifier.logits(image)?;
        if logits.is_empty() {
            return Err(AnalysisError::Inference("classifier returned no classes".into()));
        }
        if logits.iter().any(|l| !l.is_finite()) {
            return Err(AnalysisError::Inference("classifier returned non-finite scores".into()));
        }

        let normalizer = match self.config.entropy_normalizer {
            Some(normalizer) => normalizer,
            None if logits.len() >= 2 => entropy::max_entropy(logits.len()),
            None => {
                return Err(AnalysisError::Inference(
                    "cannot normalise entropy over fewer than two classes".into(),
                ));
            }
        };

        let probs = entropy::softmax(&logits);
        let h = entropy::shannon_entropy(&probs, self.config.epsilon);
        let raw = entropy::normalized_entropy(h, normalizer);
        log::debug!(
            "entropy {:.4} over {} classes, normalised {:.4}",
            h,
            logits.len(),
            raw
        );
        Ok(entropy::clamp_score(raw))
    }

    /// Scores up to `max_video_frames` leading frames and averages them.
    /// The first frame that fails to decode ends the sequence; scoring failures abort.
    pub fn score_frames<I>(&self, frames: I) -> Result<FrameScores, AnalysisError>
    where
        I: IntoIterator<Item = Result<RgbImage, AnalysisError>>,
    {
        let mut scores = Vec::with_capacity(self.config.max_video_frames);
        for frame in frames.into_iter().take(self.config.max_video_frames) {
            let frame = match frame {
                Ok(frame) => frame,
                Err(e) => {
                    log::warn!("Stopping after {} frames: {}", scores.len(), e);
                    break;
                }
            };
            scores.push(self.score(&frame)?);
        }

        let mean = entropy::mean(&scores).ok_or(AnalysisError::NoDecodableFrames)?;
        Ok(FrameScores { scores, mean })
    }

    pub fn analyze_image(&self, data: &[u8]) -> Result<AnalysisResponse, AnalysisError> {
        let image = media::decode_image(data)?;
        let score = self.score(&image)?;
        Ok(AnalysisResponse::new(MediaKind::Image, score, self.config.threshold))
    }

    pub fn analyze_video(&self, data: &[u8]) -> Result<AnalysisResponse, AnalysisError> {
        let frames = media::VideoFrames::from_bytes(data)?;
        let result = self.score_frames(frames)?;
        log::info!(
            "Scored {} video frames: {:?}",
            result.scores.len(),
            result.scores
        );
        Ok(AnalysisResponse::new(
            MediaKind::Video,
            result.mean,
            self.config.threshold,
        ))
    }
}
