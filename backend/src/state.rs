use std::sync::Arc;

use crate::config::{ResponseStyle, ServiceConfig};
use crate::fetch::ImageFetcher;
use crate::inference::model::Classifier;

/// Everything a request handler needs, built once at startup and never mutated.
pub struct AppState {
    pub model: Option<Arc<dyn Classifier>>,
    pub fetcher: ImageFetcher,
    pub normalize: bool,
    pub response_style: ResponseStyle,
}

impl AppState {
    pub fn new(
        model: Option<Arc<dyn Classifier>>,
        fetcher: ImageFetcher,
        config: &ServiceConfig,
    ) -> Self {
        Self {
            model,
            fetcher,
            normalize: config.normalize,
            response_style: config.response_style,
        }
    }

    pub fn model_loaded(&self) -> bool {
        self.model.is_some()
    }
}
