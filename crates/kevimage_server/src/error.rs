//! Mapping from workspace errors to HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use kevimage_error::{KevimageError, KevimageErrorKind};
use serde_json::json;

/// A failed request.
///
/// Renders as `{"error": <message>, "kind": <code>}` with:
/// - `400` for invalid input
/// - `502` when the source image could not be fetched
/// - `500` for everything else
#[derive(Debug, Clone)]
pub struct ApiError(pub KevimageError);

impl ApiError {
    /// HTTP status for the wrapped error.
    pub fn status(&self) -> StatusCode {
        if self.0.is_client_error() {
            return StatusCode::BAD_REQUEST;
        }
        match self.0.kind() {
            KevimageErrorKind::Fetch(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<KevimageError> for ApiError {
    fn from(err: KevimageError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.0.code();

        if status.is_server_error() {
            tracing::error!(%status, kind = code, error = %self.0, "Request failed");
        } else {
            tracing::warn!(%status, kind = code, error = %self.0, "Request rejected");
        }

        let body = json!({
            "error": self.0.message(),
            "kind": code,
        });
        (status, Json(body)).into_response()
    }
}
