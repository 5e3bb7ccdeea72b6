//! Tests for the HTTP fetcher against a local mock server.

use kevimage_core::Fetcher;
use kevimage_error::{FetchErrorKind, KevimageError, KevimageErrorKind};
use kevimage_pipeline::{HttpFetcher, HttpFetcherConfig};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetch_kind(err: &KevimageError) -> FetchErrorKind {
    match err.kind() {
        KevimageErrorKind::Fetch(e) => e.kind.clone(),
        other => panic!("expected fetch error, got {other}"),
    }
}

fn fetcher(max_bytes: u64, timeout: Duration) -> HttpFetcher {
    let config = HttpFetcherConfig::builder()
        .max_bytes(max_bytes)
        .timeout(timeout)
        .user_agent("kevimage-test")
        .build()
        .unwrap();
    HttpFetcher::new(&config).unwrap()
}

#[tokio::test]
async fn test_fetch_returns_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a.png"))
        .and(header("user-agent", "kevimage-test"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png bytes".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let body = fetcher(1024, Duration::from_secs(5))
        .fetch(&format!("{}/a.png", server.uri()))
        .await
        .unwrap();

    assert_eq!(&body[..], b"png bytes");
}

#[tokio::test]
async fn test_non_success_status_is_fetch_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = fetcher(1024, Duration::from_secs(5))
        .fetch(&format!("{}/missing.png", server.uri()))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "fetch_failed");
    assert!(matches!(
        fetch_kind(&err),
        FetchErrorKind::Status { status: 404, .. }
    ));
}

#[tokio::test]
async fn test_body_over_limit_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 4096]))
        .mount(&server)
        .await;

    let err = fetcher(1000, Duration::from_secs(5))
        .fetch(&format!("{}/big.png", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(
        fetch_kind(&err),
        FetchErrorKind::TooLarge { limit: 1000 }
    ));
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"late".to_vec())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let err = fetcher(1024, Duration::from_millis(200))
        .fetch(&format!("{}/slow.png", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(fetch_kind(&err), FetchErrorKind::Timeout(_)));
}

#[tokio::test]
async fn test_unparseable_url() {
    let err = fetcher(1024, Duration::from_secs(5))
        .fetch("not a url")
        .await
        .unwrap_err();

    assert!(matches!(fetch_kind(&err), FetchErrorKind::InvalidUrl(_)));
}

#[tokio::test]
async fn test_connection_refused_is_request_error() {
    // Bind then drop to get a port nobody listens on
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let err = fetcher(1024, Duration::from_secs(5))
        .fetch(&format!("http://127.0.0.1:{}/a.png", port))
        .await
        .unwrap_err();

    assert!(matches!(fetch_kind(&err), FetchErrorKind::Request(_)));
}
