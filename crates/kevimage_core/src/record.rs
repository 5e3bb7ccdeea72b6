//! Persisted cache records.

use crate::ContentKey;
use chrono::{DateTime, Utc};
use kevimage_error::BuilderError;
use serde::{Deserialize, Serialize};

/// One cached compression result, indexed by its source URL.
///
/// Records are append-only: once created they are never updated or removed.
///
/// # Examples
///
/// ```
/// use kevimage_core::{ContentKey, ImageRecord, OutputFormat};
///
/// let record = ImageRecord::builder()
///     .source_url("https://example.com/a.png")
///     .content_key(ContentKey::derive(b"jpeg bytes", OutputFormat::Jpeg))
///     .original_size(2048_u64)
///     .compressed_size(10_u64)
///     .mime_type("image/jpeg")
///     .created_at(chrono::Utc::now())
///     .build()
///     .unwrap();
///
/// assert_eq!(record.source_url(), "https://example.com/a.png");
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_builder::Builder,
    derive_getters::Getters,
)]
#[builder(setter(into), build_fn(error = "BuilderError"))]
pub struct ImageRecord {
    /// Original URL; unique across all records
    source_url: String,
    /// Key of the stored compressed bytes
    content_key: ContentKey,
    /// Size of the fetched source in bytes
    original_size: u64,
    /// Size of the stored artifact in bytes
    compressed_size: u64,
    /// Format of the stored artifact
    mime_type: String,
    /// Creation time, fixed at insert
    created_at: DateTime<Utc>,
}

impl ImageRecord {
    /// Creates a new record builder.
    pub fn builder() -> ImageRecordBuilder {
        ImageRecordBuilder::default()
    }
}

/// A record ready to be inserted into the index.
///
/// The creation timestamp is assigned by the index on insert.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_builder::Builder,
    derive_getters::Getters,
)]
#[builder(setter(into), build_fn(error = "BuilderError"))]
pub struct NewImageRecord {
    /// Original URL
    source_url: String,
    /// Key of the stored compressed bytes
    content_key: ContentKey,
    /// Size of the fetched source in bytes
    original_size: u64,
    /// Size of the stored artifact in bytes
    compressed_size: u64,
    /// Format of the stored artifact
    mime_type: String,
}

impl NewImageRecord {
    /// Creates a new insert builder.
    pub fn builder() -> NewImageRecordBuilder {
        NewImageRecordBuilder::default()
    }

    /// Stamp the record with its creation time.
    pub fn into_record(self, created_at: DateTime<Utc>) -> ImageRecord {
        ImageRecord {
            source_url: self.source_url,
            content_key: self.content_key,
            original_size: self.original_size,
            compressed_size: self.compressed_size,
            mime_type: self.mime_type,
            created_at,
        }
    }
}
