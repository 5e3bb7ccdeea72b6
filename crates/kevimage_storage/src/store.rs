//! Content store trait definition.

use bytes::Bytes;
use kevimage_core::ContentKey;
use kevimage_error::KevimageResult;

/// Result of a store write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteOutcome {
    /// The object was new and has been persisted
    Written,
    /// An object already existed under the key; nothing was written
    AlreadyPresent,
}

/// Durable byte storage keyed by content.
///
/// Implementations must make a successful `write` durable before returning,
/// because the caller indexes the key immediately afterwards.
#[async_trait::async_trait]
pub trait ContentStore: Send + Sync {
    /// Persist `data` under `key`.
    ///
    /// Writing to a key that already holds an object is a no-op and reports
    /// [`WriteOutcome::AlreadyPresent`].
    ///
    /// # Errors
    ///
    /// Returns a storage write error if the bytes do not hash to `key` or the
    /// backend fails to persist them.
    async fn write(&self, key: &ContentKey, data: &[u8]) -> KevimageResult<WriteOutcome>;

    /// Read the object stored under `key`.
    ///
    /// # Errors
    ///
    /// - `StorageErrorKind::NotFound` if nothing is stored under `key`
    /// - `StorageErrorKind::HashMismatch` if the stored bytes do not match `key`
    /// - `StorageErrorKind::FileRead` for any other backend failure
    async fn read(&self, key: &ContentKey) -> KevimageResult<Bytes>;

    /// Check whether an object is stored under `key`.
    async fn exists(&self, key: &ContentKey) -> KevimageResult<bool>;
}
