//! Stub collaborators and fixtures shared by the coordinator tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use kevimage_cache::CacheCoordinator;
use kevimage_core::{Compressor, Fetcher, OutputFormat};
use kevimage_database::{SqliteMetadataIndex, create_pool, run_migrations};
use kevimage_error::{CompressionError, FetchError, FetchErrorKind, KevimageResult};
use kevimage_pipeline::Pipeline;
use kevimage_storage::FileSystemContentStore;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;

/// Fetcher serving `source:<url>` bytes, or failing, after an optional delay.
#[derive(Default)]
pub struct CountingFetcher {
    pub calls: AtomicUsize,
    pub delay: Duration,
    pub fail: bool,
    /// When set, every URL yields these bytes
    pub fixed_body: Option<Bytes>,
}

impl CountingFetcher {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for CountingFetcher {
    async fn fetch(&self, url: &str) -> KevimageResult<Bytes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            return Err(FetchError::new(FetchErrorKind::Status {
                url: url.to_string(),
                status: 503,
            })
            .into());
        }
        Ok(self
            .fixed_body
            .clone()
            .unwrap_or_else(|| Bytes::from(format!("source:{}", url))))
    }
}

/// Compressor that tags its input, counting calls.
#[derive(Default)]
pub struct CountingCompressor {
    pub calls: AtomicUsize,
    pub fail: bool,
    pub panic: bool,
}

impl CountingCompressor {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Compressor for CountingCompressor {
    async fn compress(&self, input: Bytes) -> KevimageResult<Bytes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.panic {
            panic!("compressor exploded");
        }
        if self.fail {
            return Err(CompressionError::new("unsupported image format").into());
        }
        let mut out = b"jpeg:".to_vec();
        out.extend_from_slice(&input);
        Ok(Bytes::from(out))
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Jpeg
    }
}

pub struct Harness {
    pub dir: TempDir,
    pub fetcher: Arc<CountingFetcher>,
    pub compressor: Arc<CountingCompressor>,
    pub store: Arc<FileSystemContentStore>,
    pub index: Arc<SqliteMetadataIndex>,
    pub coordinator: CacheCoordinator,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(CountingFetcher::default(), CountingCompressor::default())
    }

    pub fn with(fetcher: CountingFetcher, compressor: CountingCompressor) -> Self {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(FileSystemContentStore::new(dir.path().join("cache")).unwrap());
        let db = dir.path().join("index.db");
        let pool = create_pool(db.to_str().unwrap(), 8, Duration::from_secs(5)).unwrap();
        run_migrations(&pool).unwrap();
        let index = Arc::new(SqliteMetadataIndex::new(pool));

        let fetcher = Arc::new(fetcher);
        let compressor = Arc::new(compressor);

        let pipeline = Pipeline::builder()
            .fetcher(fetcher.clone())
            .compressor(compressor.clone())
            .store(store.clone())
            .index(index.clone())
            .build()
            .unwrap();

        Self {
            dir,
            fetcher,
            compressor,
            store,
            index,
            coordinator: CacheCoordinator::new(pipeline),
        }
    }

    pub fn stored_objects(&self) -> usize {
        std::fs::read_dir(self.store.base_path()).unwrap().count()
    }
}
