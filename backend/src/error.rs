use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use shared::ErrorResponse;

use crate::fetch::FetchError;
use crate::inference::model::InferenceError;
use crate::inference::preprocess::DecodeError;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("Failed to download image: {0}")]
    Fetch(#[from] FetchError),
    #[error("{0}")]
    Decode(#[from] DecodeError),
    #[error("Model not loaded. Please try again later.")]
    ModelUnavailable,
    #[error("Inference failed: {0}")]
    Inference(#[from] InferenceError),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Logs at a level matching who is at fault.
    pub fn log(&self) {
        match self {
            ApiError::InvalidRequest(_) | ApiError::Fetch(_) | ApiError::Decode(_) => {
                log::warn!("Rejected prediction request: {}", self)
            }
            ApiError::ModelUnavailable => log::warn!("Prediction requested before model was loaded"),
            ApiError::Inference(_) | ApiError::Internal(_) => {
                log::error!("Unexpected error during prediction: {}", self)
            }
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) | ApiError::Fetch(_) | ApiError::Decode(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Inference(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self.status_code() {
            StatusCode::INTERNAL_SERVER_ERROR => INTERNAL_ERROR_MESSAGE.to_string(),
            _ => self.to_string(),
        };
        HttpResponse::build(self.status_code()).json(ErrorResponse { error })
    }
}
