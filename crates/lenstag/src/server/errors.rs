use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::multipart::{MultipartError, MultipartRejection};
use serde_json::json;
use tracing::warn;

/// Request-level failures that happen before the provider is involved.
///
/// Every variant renders as a JSON `{"error": ...}` body.
#[derive(Debug)]
pub enum AppError {
    /// The body is not `multipart/form-data`.
    NotMultipart(MultipartRejection),
    /// The multipart stream could not be read (includes the upload size limit).
    Multipart(MultipartError),
    /// No `file` field in the form.
    MissingFile,
}

impl From<MultipartRejection> for AppError {
    fn from(err: MultipartRejection) -> Self {
        AppError::NotMultipart(err)
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::Multipart(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = match self {
            AppError::NotMultipart(err) => (
                StatusCode::BAD_REQUEST,
                format!("Expected a multipart/form-data upload: {err}"),
            ),
            AppError::Multipart(err) => (
                err.status(),
                format!("Failed to read upload: {}", err.body_text()),
            ),
            AppError::MissingFile => (
                StatusCode::BAD_REQUEST,
                "Missing multipart field `file` carrying the image.".to_string(),
            ),
        };
        warn!(status = %status_code, "Rejected upload: {error_message}");

        (status_code, Json(json!({ "error": error_message }))).into_response()
    }
}
