use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

/// What kind of upload an analysis was run on.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Fake,
    Real,
}

impl Verdict {
    /// Strictly greater than the threshold is fake; a score sitting on it is real.
    pub fn from_score(score: f32, threshold: f32) -> Self {
        if score > threshold {
            Verdict::Fake
        } else {
            Verdict::Real
        }
    }

    pub fn label(&self, kind: MediaKind) -> &'static str {
        match (self, kind) {
            (Verdict::Fake, MediaKind::Image) => "Likely AI Generated / Fake",
            (Verdict::Fake, MediaKind::Video) => "Likely Deepfake",
            (Verdict::Real, _) => "Likely Real",
        }
    }
}

/// Rounds half away from zero to two decimals.
pub fn round_probability(score: f32) -> f32 {
    (score * 100.0).round() / 100.0
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AnalysisResponse {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub deepfake_probability: f32,
    pub result: String,
}

impl AnalysisResponse {
    pub fn new(kind: MediaKind, score: f32, threshold: f32) -> Self {
        let verdict = Verdict::from_score(score, threshold);
        Self {
            kind,
            deepfake_probability: round_probability(score),
            result: verdict.label(kind).to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DetectResponse {
    pub deepfake_probability: f32,
    pub note: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_strict() {
        assert_eq!(Verdict::from_score(0.5, 0.5), Verdict::Real);
        assert_eq!(Verdict::from_score(0.50001, 0.5), Verdict::Fake);
        assert_eq!(Verdict::from_score(0.0, 0.5), Verdict::Real);
        assert_eq!(Verdict::from_score(1.0, 0.5), Verdict::Fake);
    }

    #[test]
    fn labels_depend_on_media_kind() {
        assert_eq!(Verdict::Fake.label(MediaKind::Image), "Likely AI Generated / Fake");
        assert_eq!(Verdict::Fake.label(MediaKind::Video), "Likely Deepfake");
        assert_eq!(Verdict::Real.label(MediaKind::Image), "Likely Real");
        assert_eq!(Verdict::Real.label(MediaKind::Video), "Likely Real");
    }

    #[test]
    fn probability_rounds_to_two_decimals() {
        assert_eq!(round_probability(0.123), 0.12);
        assert_eq!(round_probability(0.876), 0.88);
        assert_eq!(round_probability(1.0), 1.0);
    }

    #[test]
    fn verdict_uses_unrounded_score() {
        // 0.504 rounds to 0.5 for display but is still above the threshold.
        let response = AnalysisResponse::new(MediaKind::Image, 0.504, 0.5);
        assert_eq!(response.deepfake_probability, 0.5);
        assert_eq!(response.result, "Likely AI Generated / Fake");
    }

    #[test]
    fn response_serializes_with_type_field() {
        let response = AnalysisResponse::new(MediaKind::Video, 0.25, 0.5);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["type"], "video");
        assert_eq!(value["result"], "Likely Real");
        assert!((value["deepfake_probability"].as_f64().unwrap() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn media_kind_displays_lowercase() {
        assert_eq!(MediaKind::Image.to_string(), "image");
        assert_eq!(MediaKind::Video.as_ref(), "video");
    }
}
