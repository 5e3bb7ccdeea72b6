//! Router tests driven through `tower::ServiceExt::oneshot`.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::IntoResponse;
use image::{ImageBuffer, ImageFormat, Rgb};
use kevimage_error::{KevimageError, ServerError, ServerErrorKind};
use kevimage_server::{ApiError, AppState, KevimageConfig, ServiceContext, create_router};
use serde_json::Value;
use std::io::Cursor;
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct TestApp {
    dir: TempDir,
    router: Router,
}

fn test_app() -> TestApp {
    let dir = TempDir::new().unwrap();
    let mut config = KevimageConfig::bundled();
    config.storage.cache_dir = dir.path().join("cache");
    config.database.url = dir.path().join("index.db").to_string_lossy().into_owned();

    let context = ServiceContext::initialize(&config).unwrap();
    let router = create_router(AppState::from(&context));
    TestApp { dir, router }
}

fn png_bytes() -> Vec<u8> {
    let img = ImageBuffer::from_fn(24, 16, |x, y| Rgb([x as u8 * 10, y as u8 * 15, 200]));
    let mut png = Cursor::new(Vec::new());
    img.write_to(&mut png, ImageFormat::Png).unwrap();
    png.into_inner()
}

fn compress_uri(url: &str) -> String {
    let encoded: String = url
        .chars()
        .map(|c| match c {
            ':' => "%3A".to_string(),
            '/' => "%2F".to_string(),
            ' ' => "%20".to_string(),
            other => other.to_string(),
        })
        .collect();
    format!("/compress?url={}", encoded)
}

async fn get(router: &Router, uri: &str) -> axum::response::Response {
    router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn image_server(status: u16) -> (MockServer, String) {
    image_server_at(status, "/photo.png", "/photo.png").await
}

/// Mock answering on `route`, with `file` appended to the server URI for callers.
async fn image_server_at(status: u16, route: &str, file: &str) -> (MockServer, String) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(status)
                .insert_header("content-type", "image/png")
                .set_body_bytes(png_bytes()),
        )
        .mount(&server)
        .await;
    let url = format!("{}{}", server.uri(), file);
    (server, url)
}

#[tokio::test]
async fn test_ping() {
    let app = test_app();
    let response = get(&app.router, "/ping").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["message"], "pong");
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn test_missing_url_is_bad_request() {
    let app = test_app();
    let response = get(&app.router, "/compress").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "validation_error");
    assert_eq!(body["error"], "The 'url' parameter is missing.");
}

#[tokio::test]
async fn test_empty_url_is_bad_request() {
    let app = test_app();
    let response = get(&app.router, "/compress?url=").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["kind"], "validation_error");
}

#[tokio::test]
async fn test_non_http_url_is_bad_request() {
    let app = test_app();

    let response = get(&app.router, &compress_uri("ftp://example.com/a.png")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(&app.router, &compress_uri("not a url")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_compress_miss_then_hit() {
    let app = test_app();
    let (_server, url) = image_server(200).await;

    let first = get(&app.router, &compress_uri(&url)).await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(first.headers()[header::CONTENT_TYPE], "image/jpeg");
    assert_eq!(first.headers()["x-cache"], "MISS");

    let etag = first.headers()[header::ETAG].to_str().unwrap().to_string();
    assert!(etag.starts_with('"') && etag.ends_with(".jpg\""));

    let first_bytes = axum::body::to_bytes(first.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&first_bytes[..2], &[0xFF, 0xD8]);

    let second = get(&app.router, &compress_uri(&url)).await;
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(second.headers()["x-cache"], "HIT");
    assert_eq!(second.headers()[header::ETAG].to_str().unwrap(), etag);

    let second_bytes = axum::body::to_bytes(second.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(first_bytes, second_bytes);
}

#[tokio::test]
async fn test_upstream_failure_is_bad_gateway() {
    let app = test_app();
    let (_server, url) = image_server(404).await;

    let response = get(&app.router, &compress_uri(&url)).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "fetch_failed");
    assert!(body["error"].as_str().unwrap().contains("404"));
}

#[tokio::test]
async fn test_missing_stored_bytes_is_internal_error() {
    let app = test_app();
    let (_server, url) = image_server(200).await;

    let first = get(&app.router, &compress_uri(&url)).await;
    assert_eq!(first.status(), StatusCode::OK);
    let key = first.headers()[header::ETAG]
        .to_str()
        .unwrap()
        .trim_matches('"')
        .to_string();

    std::fs::remove_file(app.dir.path().join("cache").join(&key)).unwrap();

    let response = get(&app.router, &compress_uri(&url)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["kind"], "corrupt_cache_entry");
}

#[tokio::test]
async fn test_url_with_space_in_path_is_fetched() {
    let app = test_app();
    let (_server, url) = image_server_at(200, "/my%20photo.png", "/my photo.png").await;

    let response = get(&app.router, &compress_uri(&url)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
    assert_eq!(response.headers()["x-cache"], "MISS");
}

#[tokio::test]
async fn test_response_build_failure_is_internal_error() {
    let err = ApiError::from(KevimageError::from(ServerError::new(
        ServerErrorKind::Response("bad header".to_string()),
    )));
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["kind"], "server_error");
}
