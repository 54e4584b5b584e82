use shared::{PredictResponse, Verdict};

use crate::config::ResponseStyle;

pub const THRESHOLD: f32 = 0.5;

/// Probabilities below the threshold are Ghibli; the model scores the
/// "not Ghibli" class.
pub fn classify(probability: f32) -> Verdict {
    if probability < THRESHOLD {
        Verdict::Ghibli
    } else {
        Verdict::NotGhibli
    }
}

/// Distance from the threshold scaled to `[0, 1]`, rounded to 4 places.
pub fn confidence(probability: f32) -> f64 {
    let distance = (f64::from(THRESHOLD) - f64::from(probability)).abs() * 2.0;
    (distance.min(1.0) * 10_000.0).round() / 10_000.0
}

pub fn build_response(probability: f32, style: ResponseStyle) -> PredictResponse {
    let predicted_class = classify(probability);
    match style {
        ResponseStyle::Detailed => PredictResponse {
            predicted_class,
            confidence: Some(confidence(probability)),
            raw_prediction: Some(probability),
            predictions: None,
        },
        ResponseStyle::Legacy => PredictResponse {
            predicted_class,
            confidence: None,
            raw_prediction: None,
            predictions: Some(vec![vec![probability]]),
        },
    }
}
