//! Behavioural tests for `CacheCoordinator::resolve`.

mod common;

use bytes::Bytes;
use common::{CountingCompressor, CountingFetcher, Harness};
use kevimage_cache::CacheStatus;
use kevimage_core::{ContentKey, MetadataIndex, OutputFormat};
use kevimage_storage::ContentStore;
use std::time::Duration;

const URL: &str = "https://example.com/a.png";

#[tokio::test]
async fn test_second_resolution_is_a_hit() {
    let h = Harness::new();

    let first = h.coordinator.resolve(URL).await.unwrap();
    let second = h.coordinator.resolve(URL).await.unwrap();

    assert_eq!(*first.status(), CacheStatus::Miss);
    assert_eq!(*second.status(), CacheStatus::Hit);
    assert_eq!(first.artifact(), second.artifact());
    assert_eq!(h.fetcher.calls(), 1);
    assert_eq!(h.compressor.calls(), 1);
    assert_eq!(h.index.count().await.unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_misses_produce_once() {
    let h = Harness::with(
        CountingFetcher {
            delay: Duration::from_millis(200),
            ..Default::default()
        },
        CountingCompressor::default(),
    );

    let callers: Vec<_> = (0..8)
        .map(|_| {
            let coordinator = h.coordinator.clone();
            tokio::spawn(async move { coordinator.resolve(URL).await })
        })
        .collect();

    let mut artifacts = Vec::new();
    for caller in callers {
        artifacts.push(caller.await.unwrap().unwrap());
    }

    assert_eq!(h.fetcher.calls(), 1);
    assert_eq!(h.compressor.calls(), 1);
    assert!(
        artifacts
            .iter()
            .all(|r| r.artifact() == artifacts[0].artifact())
    );
    assert!(
        artifacts
            .iter()
            .any(|r| *r.status() == CacheStatus::Miss)
    );
    assert_eq!(h.index.count().await.unwrap(), 1);
    assert_eq!(h.coordinator.in_flight(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_failure_is_broadcast_and_not_cached() {
    let h = Harness::with(
        CountingFetcher {
            delay: Duration::from_millis(200),
            fail: true,
            ..Default::default()
        },
        CountingCompressor::default(),
    );

    let callers: Vec<_> = (0..4)
        .map(|_| {
            let coordinator = h.coordinator.clone();
            tokio::spawn(async move { coordinator.resolve(URL).await })
        })
        .collect();

    for caller in callers {
        let err = caller.await.unwrap().unwrap_err();
        assert_eq!(err.code(), "fetch_failed");
    }

    assert_eq!(h.fetcher.calls(), 1);
    assert_eq!(h.compressor.calls(), 0);
    assert_eq!(h.index.count().await.unwrap(), 0);
    assert_eq!(h.coordinator.in_flight(), 0);

    // No negative caching: the next request tries again
    h.coordinator.resolve(URL).await.unwrap_err();
    assert_eq!(h.fetcher.calls(), 2);
}

#[tokio::test]
async fn test_missing_bytes_is_corrupt_entry_not_refetch() {
    let h = Harness::new();

    let first = h.coordinator.resolve(URL).await.unwrap();
    std::fs::remove_file(h.store.path_for(first.artifact().content_key())).unwrap();

    let err = h.coordinator.resolve(URL).await.unwrap_err();

    assert_eq!(err.code(), "corrupt_cache_entry");
    assert_eq!(h.fetcher.calls(), 1);
}

#[tokio::test]
async fn test_damaged_bytes_is_corrupt_entry() {
    let h = Harness::new();

    let first = h.coordinator.resolve(URL).await.unwrap();
    std::fs::write(h.store.path_for(first.artifact().content_key()), b"garbage").unwrap();

    let err = h.coordinator.resolve(URL).await.unwrap_err();
    assert_eq!(err.code(), "corrupt_cache_entry");
}

#[tokio::test]
async fn test_store_without_index_reruns_pipeline() {
    let h = Harness::new();

    // Simulate a crash after the store write but before the index write
    let compressed = Bytes::from(format!("jpeg:source:{}", URL));
    let key = ContentKey::derive(&compressed, OutputFormat::Jpeg);
    h.store.write(&key, &compressed).await.unwrap();
    assert!(h.index.find_by_url(URL).await.unwrap().is_none());

    let resolution = h.coordinator.resolve(URL).await.unwrap();

    assert_eq!(*resolution.status(), CacheStatus::Miss);
    assert_eq!(resolution.artifact().content_key(), &key);
    assert_eq!(h.fetcher.calls(), 1);
    assert_eq!(h.stored_objects(), 1);
    assert!(h.index.find_by_url(URL).await.unwrap().is_some());
}

#[tokio::test]
async fn test_identical_output_shares_one_object() {
    let h = Harness::with(
        CountingFetcher {
            fixed_body: Some(Bytes::from_static(b"same pixels")),
            ..Default::default()
        },
        CountingCompressor::default(),
    );

    let a = h.coordinator.resolve("https://a.example.com/x.png").await.unwrap();
    let b = h.coordinator.resolve("https://b.example.com/y.png").await.unwrap();

    assert_eq!(a.artifact().content_key(), b.artifact().content_key());
    assert_eq!(h.stored_objects(), 1);
    assert_eq!(h.index.count().await.unwrap(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_dropped_caller_does_not_cancel_production() {
    let h = Harness::with(
        CountingFetcher {
            delay: Duration::from_millis(300),
            ..Default::default()
        },
        CountingCompressor::default(),
    );

    let timed_out =
        tokio::time::timeout(Duration::from_millis(50), h.coordinator.resolve(URL)).await;
    assert!(timed_out.is_err());
    assert_eq!(h.coordinator.in_flight(), 1);

    assert_eq!(h.coordinator.drain().await, 1);
    assert_eq!(h.coordinator.in_flight(), 0);
    assert!(h.index.find_by_url(URL).await.unwrap().is_some());

    let later = h.coordinator.resolve(URL).await.unwrap();
    assert_eq!(*later.status(), CacheStatus::Hit);
    assert_eq!(h.fetcher.calls(), 1);
}

#[tokio::test]
async fn test_panicking_production_is_aborted_and_released() {
    let h = Harness::with(
        CountingFetcher::default(),
        CountingCompressor {
            panic: true,
            ..Default::default()
        },
    );

    let err = h.coordinator.resolve(URL).await.unwrap_err();

    assert_eq!(err.code(), "production_aborted");
    assert_eq!(h.coordinator.in_flight(), 0);
    assert_eq!(h.index.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_compression_failure_propagates() {
    let h = Harness::with(
        CountingFetcher::default(),
        CountingCompressor {
            fail: true,
            ..Default::default()
        },
    );

    let err = h.coordinator.resolve(URL).await.unwrap_err();
    assert_eq!(err.code(), "compression_failed");
    assert_eq!(h.stored_objects(), 0);
}

#[tokio::test]
async fn test_empty_url_is_validation_error() {
    let h = Harness::new();

    let err = h.coordinator.resolve("  ").await.unwrap_err();
    assert_eq!(err.code(), "validation_error");
    assert_eq!(h.fetcher.calls(), 0);
}

#[tokio::test]
async fn test_drain_with_nothing_in_flight() {
    let h = Harness::new();
    assert_eq!(h.coordinator.drain().await, 0);
}
