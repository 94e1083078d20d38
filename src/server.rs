use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::any::Any;
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer};

use crate::error::{AnalysisError, ApiError, ErrorStyle};
use crate::handlers::{Analyzer, UseCase};
use crate::models::Upload;

/// Multipart field names accepted as the uploaded image.
const UPLOAD_FIELDS: [&str; 2] = ["file", "image"];

/// Room for multipart boundaries and headers on top of the image itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub struct AppState {
    pub analyzer: Arc<Analyzer>,
}

pub fn create_router(analyzer: Arc<Analyzer>) -> Router {
    let body_limit = analyzer.max_upload_bytes().saturating_add(MULTIPART_OVERHEAD);
    let state = Arc::new(AppState { analyzer });

    // Panics on an analysis route answer in that route's error style.
    let pantry = post(analyze_pantry).layer(CatchPanicLayer::custom(panic_with_error_key));
    let freshness = post(check_freshness).layer(CatchPanicLayer::custom(panic_with_error_key));
    let attraction = post(analyze_attraction).layer(CatchPanicLayer::custom(panic_with_detail_key));

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .route("/analyze-pantry", pantry.clone())
        .route("/analyze-pantry/", pantry)
        .route("/check-freshness", freshness.clone())
        .route("/check-freshness/", freshness)
        .route("/analyze-attraction", attraction.clone())
        .route("/analyze-attraction/", attraction)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(CatchPanicLayer::custom(panic_with_detail_key))
        .with_state(state)
}

async fn analyze_pantry(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, ApiError> {
    run_analysis(&state, UseCase::Pantry, multipart).await
}

async fn check_freshness(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, ApiError> {
    run_analysis(&state, UseCase::Freshness, multipart).await
}

async fn analyze_attraction(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, ApiError> {
    run_analysis(&state, UseCase::Attraction, multipart).await
}

async fn run_analysis(
    state: &AppState,
    use_case: UseCase,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, ApiError> {
    let result = match multipart {
        Ok(multipart) => match read_upload(multipart).await {
            Ok(upload) => state.analyzer.analyze(use_case, upload).await,
            Err(e) => Err(e),
        },
        Err(rejection) => {
            log::warn!("⚠️ {} request is not multipart: {}", use_case, rejection);
            Err(AnalysisError::InvalidInput(
                "Expected a multipart/form-data upload".to_string(),
            ))
        }
    };

    match result {
        Ok(body) => Ok(Json(body)),
        Err(e) => {
            log::warn!("⚠️ {} failed: {}", use_case, e);
            Err(ApiError::new(use_case.error_style(), e))
        }
    }
}

/// Pull the first image field out of a multipart body.
async fn read_upload(mut multipart: Multipart) -> Result<Upload, AnalysisError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AnalysisError::InvalidInput(format!("Failed to read multipart field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        if !UPLOAD_FIELDS.contains(&name.as_str()) {
            log::debug!("Skipping multipart field '{}'", name);
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AnalysisError::InvalidInput(format!("Failed to read uploaded file: {}", e)))?;

        return Ok(Upload {
            file_name,
            content_type,
            bytes,
        });
    }

    Err(AnalysisError::InvalidInput(
        "Missing file field (expected 'file' or 'image')".to_string(),
    ))
}

fn panic_with_error_key(err: Box<dyn Any + Send + 'static>) -> Response {
    panic_response(ErrorStyle::Error, err)
}

fn panic_with_detail_key(err: Box<dyn Any + Send + 'static>) -> Response {
    panic_response(ErrorStyle::Detail, err)
}

fn panic_response(style: ErrorStyle, err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    ApiError::new(
        style,
        AnalysisError::Internal(anyhow::anyhow!("handler panicked: {}", detail)),
    )
    .into_response()
}

async fn root_handler() -> Json<Value> {
    Json(json!({ "message": "Pantry Lens API is running" }))
}

async fn health_check() -> &'static str {
    "OK"
}
