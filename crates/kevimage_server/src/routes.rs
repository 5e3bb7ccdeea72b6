//! HTTP endpoints.

use crate::{ApiError, ServiceContext};
use axum::{
    Json, Router,
    body::Body,
    extract::{Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use kevimage_cache::CacheCoordinator;
use kevimage_error::{KevimageError, ServerError, ServerErrorKind, ValidationError};
use reqwest::Url;
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;

/// Header reporting how a `/compress` request was served.
pub const X_CACHE: &str = "x-cache";

/// Router state.
#[derive(Clone, Debug)]
pub struct AppState {
    coordinator: CacheCoordinator,
}

impl AppState {
    /// Creates new router state.
    pub fn new(coordinator: CacheCoordinator) -> Self {
        Self { coordinator }
    }
}

impl From<&ServiceContext> for AppState {
    fn from(context: &ServiceContext) -> Self {
        Self::new(context.coordinator().clone())
    }
}

/// Creates the service router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/compress", get(compress))
        .route("/ping", get(ping))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct CompressParams {
    url: Option<String>,
}

fn invalid(message: impl Into<String>) -> ApiError {
    ApiError::from(KevimageError::from(ValidationError::new(message)))
}

/// Accept only absolute `http`/`https` URLs with a host, parsed the same way
/// the fetcher parses them.
fn validate_source_url(raw: Option<String>) -> Result<String, ApiError> {
    let url = raw.ok_or_else(|| invalid("The 'url' parameter is missing."))?;
    let url = url.trim().to_string();
    if url.is_empty() {
        return Err(invalid("The 'url' parameter is empty."));
    }

    let parsed = Url::parse(&url)
        .map_err(|e| invalid(format!("The 'url' parameter is not a valid URL: {}", e)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("The 'url' parameter must be an http or https URL."));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(invalid("The 'url' parameter has no host."));
    }

    Ok(url)
}

/// Compressed bytes for the `url` query parameter.
#[tracing::instrument(skip_all)]
async fn compress(
    State(state): State<AppState>,
    Query(params): Query<CompressParams>,
) -> Result<Response, ApiError> {
    let url = validate_source_url(params.url)?;

    let (artifact, status) = state.coordinator.resolve(&url).await?.into_parts();

    let etag = HeaderValue::from_str(&format!("\"{}\"", artifact.content_key())).map_err(|e| {
        KevimageError::from(ServerError::new(ServerErrorKind::Response(format!(
            "content key {} is not a valid ETag: {}",
            artifact.content_key(),
            e
        ))))
    })?;
    let content_type = HeaderValue::from_str(artifact.mime_type())
        .unwrap_or(HeaderValue::from_static("application/octet-stream"));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::ETAG, etag),
            (
                header::HeaderName::from_static(X_CACHE),
                HeaderValue::from_static(status.as_header()),
            ),
        ],
        Body::from(artifact.bytes().clone()),
    )
        .into_response())
}

/// Liveness probe.
async fn ping() -> impl IntoResponse {
    tracing::debug!("Ping received");
    (
        StatusCode::OK,
        Json(json!({
            "message": "pong",
            "status": "ok",
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
    )
}
