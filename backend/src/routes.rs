use actix_cors::Cors;
use actix_web::error::JsonPayloadError;
use actix_web::{HttpRequest, HttpResponse, http::header, web};
use log::info;
use shared::{HealthResponse, PredictRequest, PredictResponse};
use url::Url;

use crate::error::ApiError;
use crate::fetch::parse_image_url;
use crate::inference::preprocess::preprocess;
use crate::inference::verdict::build_response;
use crate::state::AppState;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(web::resource("/health").route(web::get().to(health)))
        .service(web::resource("/predict").route(web::post().to(predict)));
}

/// The browser extension calls the service from arbitrary pages.
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
        .max_age(3600)
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .content_type_required(true)
        .error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
            let message = match &err {
                JsonPayloadError::ContentType => {
                    "Content-Type must be application/json".to_string()
                }
                JsonPayloadError::Deserialize(e) => format!("Invalid JSON body: {}", e),
                other => format!("Invalid request body: {}", other),
            };
            let api_err = ApiError::InvalidRequest(message);
            api_err.log();
            api_err.into()
        })
}

async fn health(state: web::Data<AppState>) -> HttpResponse {
    if state.model_loaded() {
        HttpResponse::Ok().json(HealthResponse {
            status: "healthy".into(),
            message: "Model is loaded".into(),
        })
    } else {
        HttpResponse::ServiceUnavailable().json(HealthResponse {
            status: "error".into(),
            message: "Model not loaded".into(),
        })
    }
}

async fn predict(
    state: web::Data<AppState>,
    body: web::Json<PredictRequest>,
) -> Result<HttpResponse, ApiError> {
    match run_prediction(&state, body.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(response)),
        Err(e) => {
            e.log();
            Err(e)
        }
    }
}

fn validate(request: &PredictRequest) -> Result<Url, ApiError> {
    let raw = request
        .image_url
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::InvalidRequest("No image URL provided".into()))?;

    parse_image_url(raw)
        .ok_or_else(|| ApiError::InvalidRequest(format!("Invalid image URL: {}", raw)))
}

async fn run_prediction(
    state: &AppState,
    request: PredictRequest,
) -> Result<PredictResponse, ApiError> {
    let url = validate(&request)?;

    let source = url.to_string();
    let bytes = state.fetcher.fetch(url).await?;

    let model = state.model.clone();
    let normalize = state.normalize;
    let probability = web::block(move || -> Result<f32, ApiError> {
        let tensor = preprocess(&bytes, normalize)?;
        let model = model.ok_or(ApiError::ModelUnavailable)?;
        Ok(model.predict(&tensor)?)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Blocking task failed: {}", e)))??;

    let response = build_response(probability, state.response_style);
    info!(
        "Prediction for {}: {} (p={:.4})",
        source, response.predicted_class, probability
    );
    Ok(response)
}
