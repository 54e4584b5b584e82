use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct PredictRequest {
    #[serde(default)]
    pub image_url: Option<String>,
}

impl PredictRequest {
    pub fn new(image_url: impl Into<String>) -> Self {
        Self {
            image_url: Some(image_url.into()),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Display, EnumString, AsRefStr)]
pub enum Verdict {
    #[serde(rename = "Ghibli")]
    #[strum(serialize = "Ghibli")]
    Ghibli,
    #[serde(rename = "Not Ghibli")]
    #[strum(serialize = "Not Ghibli")]
    NotGhibli,
}

/// Body of a successful `/predict` call.
///
/// The detailed shape carries `confidence` and `raw_prediction`; the legacy
/// shape carries the raw model output as `predictions: [[p]]`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PredictResponse {
    pub predicted_class: Verdict,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_prediction: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predictions: Option<Vec<Vec<f32>>>,
}

impl PredictResponse {
    pub fn is_ghibli(&self) -> bool {
        self.predicted_class == Verdict::Ghibli
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}
