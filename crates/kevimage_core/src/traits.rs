//! Collaborator traits the pipeline and coordinator are written against.

use crate::{ImageRecord, NewImageRecord, OutputFormat};
use async_trait::async_trait;
use bytes::Bytes;
use kevimage_error::KevimageResult;

/// Downloads source images.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the raw bytes behind `url`.
    ///
    /// Network errors, non-2xx statuses and timeouts are all fetch failures.
    async fn fetch(&self, url: &str) -> KevimageResult<Bytes>;
}

/// Transcodes source images into the stored format.
#[async_trait]
pub trait Compressor: Send + Sync {
    /// Transcode `input` at this compressor's quality target.
    async fn compress(&self, input: Bytes) -> KevimageResult<Bytes>;

    /// Format of everything this compressor produces.
    fn format(&self) -> OutputFormat;
}

/// Queryable mapping from source URL to cache record.
#[async_trait]
pub trait MetadataIndex: Send + Sync {
    /// Look up the record for `source_url`, if one exists.
    async fn find_by_url(&self, source_url: &str) -> KevimageResult<Option<ImageRecord>>;

    /// Insert a record and return it with its creation time.
    ///
    /// # Errors
    ///
    /// A record for the same source URL already existing is reported as a
    /// `DatabaseErrorKind::UniqueViolation`.
    async fn insert(&self, record: NewImageRecord) -> KevimageResult<ImageRecord>;

    /// Number of records in the index.
    async fn count(&self) -> KevimageResult<u64>;
}
