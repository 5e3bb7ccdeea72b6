//! Fetch, transcode, store and index one source URL.

use kevimage_core::{
    Artifact, Compressor, ContentKey, Fetcher, ImageRecord, MetadataIndex, NewImageRecord,
};
use kevimage_error::{
    BuilderError, CacheError, CacheErrorKind, KevimageError, KevimageErrorKind, KevimageResult,
};
use kevimage_storage::{ContentStore, WriteOutcome};
use std::sync::Arc;

/// Outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct Produced {
    /// Index record for the source URL
    record: ImageRecord,
    /// Bytes the record points at
    artifact: Artifact,
}

impl Produced {
    /// Split into record and artifact.
    pub fn into_parts(self) -> (ImageRecord, Artifact) {
        (self.record, self.artifact)
    }
}

/// Orchestrates the collaborators that turn a cache miss into a stored artifact.
///
/// The pipeline holds no per-URL state; the coordinator guarantees at most one
/// run per URL at a time.
///
/// # Examples
///
/// ```no_run
/// use kevimage_database::{SqliteMetadataIndex, create_pool, run_migrations};
/// use kevimage_pipeline::{HttpFetcher, HttpFetcherConfig, JpegCompressor, Pipeline};
/// use kevimage_storage::FileSystemContentStore;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool("kevimage.db", 4, Duration::from_secs(5))?;
/// run_migrations(&pool)?;
///
/// let pipeline = Pipeline::builder()
///     .fetcher(Arc::new(HttpFetcher::new(&HttpFetcherConfig::default())?))
///     .compressor(Arc::new(JpegCompressor::default()))
///     .store(Arc::new(FileSystemContentStore::new("cache")?))
///     .index(Arc::new(SqliteMetadataIndex::new(pool)))
///     .build()?;
///
/// let produced = pipeline.produce("https://example.com/a.png").await?;
/// println!("{}", produced.record().content_key());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, derive_builder::Builder)]
#[builder(pattern = "owned", build_fn(error = "BuilderError"))]
pub struct Pipeline {
    /// Source downloader
    fetcher: Arc<dyn Fetcher>,
    /// Transcoder
    compressor: Arc<dyn Compressor>,
    /// Durable byte storage
    store: Arc<dyn ContentStore>,
    /// URL to record mapping
    index: Arc<dyn MetadataIndex>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("format", &self.compressor.format())
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Creates a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// The metadata index this pipeline writes to.
    pub fn index(&self) -> &Arc<dyn MetadataIndex> {
        &self.index
    }

    /// The content store this pipeline writes to.
    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    /// Produce the artifact for `source_url` and index it.
    ///
    /// Steps run strictly in order: fetch, compress, derive the content key,
    /// write to the store, insert into the index. Nothing is retried.
    ///
    /// If another writer indexed `source_url` first, the race is logged and
    /// the existing record is returned instead.
    ///
    /// # Errors
    ///
    /// - fetch failures from the fetcher
    /// - compression failures from the compressor
    /// - storage write failures from the store (nothing is indexed)
    /// - index failures other than a duplicate source URL
    #[tracing::instrument(skip(self))]
    pub async fn produce(&self, source_url: &str) -> KevimageResult<Produced> {
        let original = self.fetcher.fetch(source_url).await?;
        let original_size = original.len() as u64;

        let compressed = self.compressor.compress(original).await?;
        let format = self.compressor.format();
        let content_key = ContentKey::derive(&compressed, format);

        let outcome = self.store.write(&content_key, &compressed).await?;
        if outcome == WriteOutcome::AlreadyPresent {
            tracing::debug!(key = %content_key, "Sharing existing stored object");
        }

        let new_record = NewImageRecord::builder()
            .source_url(source_url)
            .content_key(content_key.clone())
            .original_size(original_size)
            .compressed_size(compressed.len() as u64)
            .mime_type(format.mime_type())
            .build()?;

        match self.index.insert(new_record).await {
            Ok(record) => {
                tracing::info!(
                    key = %content_key,
                    original_size,
                    compressed_size = compressed.len(),
                    "Produced artifact"
                );
                let artifact = Artifact::new(compressed, format.mime_type(), content_key);
                Ok(Produced { record, artifact })
            }
            Err(e) if is_unique_violation(&e) => {
                self.recover_from_race(source_url, content_key, compressed)
                    .await
            }
            Err(e) => Err(e),
        }
    }

    async fn recover_from_race(
        &self,
        source_url: &str,
        our_key: ContentKey,
        our_bytes: bytes::Bytes,
    ) -> KevimageResult<Produced> {
        let race = CacheError::new(CacheErrorKind::RaceDetected(source_url.to_string()));
        tracing::warn!(error = %race, "Source URL already indexed, serving existing record");

        let record = self.index.find_by_url(source_url).await?.ok_or(race)?;

        let bytes = if *record.content_key() == our_key {
            our_bytes
        } else {
            self.store
                .read(record.content_key())
                .await
                .map_err(|e| corrupt_entry(&record, &e))?
        };

        let artifact = Artifact::from_record(&record, bytes);
        Ok(Produced { record, artifact })
    }
}

fn is_unique_violation(err: &KevimageError) -> bool {
    matches!(err.kind(), KevimageErrorKind::Database(e) if e.is_unique_violation())
}

/// Error for an index record whose stored bytes cannot be served.
pub fn corrupt_entry(record: &ImageRecord, cause: &KevimageError) -> KevimageError {
    CacheError::new(CacheErrorKind::CorruptEntry {
        url: record.source_url().clone(),
        key: record.content_key().to_string(),
        reason: cause.message(),
    })
    .into()
}
