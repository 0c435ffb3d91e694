use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{HeaderValue, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use statement_to_csv::TesseractOcr;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::models::{HealthResponse, UploadOutcome};
use crate::upload::{UploadForm, process_upload};
use crate::view::{self, HtmlView, JsonView};

#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(index_route))
        .route("/upload", post(upload_route))
        .route("/api/v1/convert", post(convert_route))
        .route("/healthz", get(health_route))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

async fn index_route() -> Response {
    let mut response = Html(view::upload_form()).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

async fn upload_route(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let result = handle_upload(&state, multipart).await;
    view::render(&HtmlView, &result)
}

async fn convert_route(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let result = handle_upload(&state, multipart).await;
    view::render(&JsonView, &result)
}

async fn health_route() -> Json<HealthResponse> {
    let ocr_available = tokio::task::spawn_blocking(TesseractOcr::is_available)
        .await
        .unwrap_or(false);

    Json(HealthResponse {
        status: "ok".to_string(),
        ocr_available,
    })
}

async fn handle_upload(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<UploadOutcome, ApiError> {
    let form = read_form(multipart?).await?;
    let result = process_upload(form, Arc::clone(&state.config)).await;
    if let Err(error) = &result {
        tracing::warn!(code = error.code(), message = error.message(), "upload rejected");
    }
    result
}

/// Collects the `file_type` and `file` fields; anything else is ignored.
async fn read_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm {
        file_type: None,
        file_name: None,
        bytes: Vec::new(),
    };

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(ToString::to_string);
        match name.as_deref() {
            Some("file_type") => form.file_type = Some(field.text().await?),
            Some("file") => {
                form.file_name = field.file_name().map(ToString::to_string);
                form.bytes = field.bytes().await?.to_vec();
            }
            _ => {}
        }
    }

    Ok(form)
}
