mod config;
mod error;
mod fetch;
mod inference;
mod logging;
mod routes;
mod state;

#[cfg(test)]
mod test_support;

use actix_web::{App, HttpServer, middleware, web};
use config::ServiceConfig;
use fetch::ImageFetcher;
use inference::model::load_model;
use routes::configure_routes;
use state::AppState;
use std::env;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = ServiceConfig::load().map_err(|e| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("Configuration error: {}", e),
        )
    })?;

    let _log_guard = logging::init(&config.log_level, config.log_dir.as_deref())?;

    #[cfg(not(feature = "torch"))]
    log::error!("Built without the `torch` feature: no model can be loaded and /predict will return 503");

    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    } else {
        log::error!("Failed to get the current working directory.");
    }

    let model = match load_model(&config.model_path) {
        Ok(model) => {
            log::info!("Model loaded from {}", config.model_path.display());
            Some(model)
        }
        Err(e) => {
            log::error!(
                "Failed to load model from {}: {}. /health will report unhealthy.",
                config.model_path.display(),
                e
            );
            None
        }
    };

    let fetcher = ImageFetcher::new(config.fetch_timeout(), config.max_image_bytes).map_err(|e| {
        std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("Failed to build HTTP client: {}", e),
        )
    })?;

    let state = web::Data::new(AppState::new(model, fetcher, &config));
    let bind_address = config.bind_address();

    log::info!(
        "Starting server on {} (fetch timeout {}s, normalize={}, response style {:?})",
        bind_address,
        config.fetch_timeout_secs,
        config.normalize,
        config.response_style
    );

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .wrap(routes::cors())
            .app_data(state.clone())
            .configure(configure_routes)
    })
    .bind(&bind_address)?
    .run()
    .await
}
