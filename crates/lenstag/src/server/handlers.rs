//! # Route Handlers
//!
//! `/health` reports which provider and schema back the service without
//! calling the provider. `/lensTag` reads the upload, runs the tagger and maps
//! the typed outcome onto an HTTP status; every body is JSON.

use super::{errors::AppError, state::AppState};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::multipart::{Multipart, MultipartRejection};
use lenstag_core::{TagOutcome, TaggingRequest};
use serde::Serialize;
use serde_json::json;
use tracing::info;

/// Name reported by `/health`.
pub const SERVICE_NAME: &str = "LensTag API";

/// The handler for the root (`/`) endpoint.
pub async fn root() -> &'static str {
    "LensTag API is running."
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub provider: &'static str,
    pub model: String,
    pub schema: &'static str,
}

/// The handler for the health check (`/health`) endpoint.
pub async fn health_check(State(app_state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: SERVICE_NAME,
        version: lenstag_core::VERSION,
        provider: app_state.tagger.provider_name(),
        model: app_state.tagger.model().to_string(),
        schema: app_state.tagger.schema().version(),
    })
}

/// The handler for `POST /lensTag`.
///
/// Expects a multipart form with the image in a `file` field.
pub async fn lens_tag_handler(
    State(app_state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let request = read_upload(multipart?).await?;
    info!(
        file = request.file_name.as_deref().unwrap_or("<unnamed>"),
        content_type = request.content_type.as_deref().unwrap_or("<none>"),
        bytes = request.bytes.len(),
        "Received image upload"
    );

    let outcome = app_state.tagger.tag(&request).await;
    Ok(outcome_response(&outcome))
}

/// Fallback for unknown routes, so even 404s carry a JSON body.
pub async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Not found" })),
    )
        .into_response()
}

/// Pull the `file` field out of the form. Other fields are ignored.
async fn read_upload(mut multipart: Multipart) -> Result<TaggingRequest, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;

        let mut request = TaggingRequest::new(bytes.to_vec(), content_type);
        request.file_name = file_name;
        return Ok(request);
    }
    Err(AppError::MissingFile)
}

/// HTTP status for each outcome.
///
/// The provider is upstream of us, so its failures are gateway errors.
pub fn outcome_status(outcome: &TagOutcome) -> StatusCode {
    match outcome {
        TagOutcome::Tagged { .. } => StatusCode::OK,
        TagOutcome::UpstreamError(err) if err.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
        TagOutcome::UpstreamError(_) | TagOutcome::MalformedOutput { .. } => {
            StatusCode::BAD_GATEWAY
        }
    }
}

fn outcome_response(outcome: &TagOutcome) -> Response {
    (outcome_status(outcome), Json(outcome.to_body())).into_response()
}
