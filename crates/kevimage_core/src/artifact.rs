//! What a resolution hands back to callers.

use crate::{ContentKey, ImageRecord};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Compressed image bytes plus their mime type.
///
/// Cloning is cheap: the bytes are reference counted, so one produced artifact
/// can be handed to every caller waiting on the same production.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct Artifact {
    /// Compressed bytes exactly as stored
    bytes: Bytes,
    /// Format of the bytes
    mime_type: String,
    /// Key the bytes are stored under
    content_key: ContentKey,
}

impl Artifact {
    /// Create an artifact from stored bytes.
    pub fn new(bytes: Bytes, mime_type: impl Into<String>, content_key: ContentKey) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
            content_key,
        }
    }

    /// Pair a record with the bytes it points at.
    pub fn from_record(record: &ImageRecord, bytes: Bytes) -> Self {
        Self::new(bytes, record.mime_type(), record.content_key().clone())
    }

    /// Number of bytes in the artifact.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the artifact holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// How a resolution was satisfied.
///
/// # Examples
///
/// ```
/// use kevimage_core::CacheStatus;
///
/// assert_eq!(CacheStatus::Hit.as_header(), "HIT");
/// assert_eq!(CacheStatus::Joined.to_string(), "joined");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    /// Served from an existing index record
    #[display("hit")]
    Hit,
    /// This caller started the production
    #[display("miss")]
    Miss,
    /// This caller waited on a production started by another caller
    #[display("joined")]
    Joined,
}

impl CacheStatus {
    /// Value for the `X-Cache` response header.
    pub fn as_header(&self) -> &'static str {
        match self {
            Self::Hit => "HIT",
            Self::Miss => "MISS",
            Self::Joined => "JOINED",
        }
    }
}
