//! Filesystem content store.
//!
//! Objects live directly in the cache directory, named by their content key.

use crate::{ContentStore, WriteOutcome};
use bytes::Bytes;
use kevimage_core::ContentKey;
use kevimage_error::{KevimageResult, StorageError, StorageErrorKind};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Filesystem storage backend.
///
/// Flat layout: `{base_path}/{sha256-hex}.{ext}`.
///
/// ```text
/// cache/
/// ├── 2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824.jpg
/// └── 486ea46224d1bb4fb680f34f7c9ad96a8f24ec88be73ea8e5a6c65260e9cb8a7.jpg
/// ```
///
/// Writes go to a uniquely named `.tmp` file in the same directory, are synced
/// to disk and then renamed over the final name, so readers never observe a
/// partially written object. The directory is synced after the rename, so a
/// write that has returned survives a crash.
#[derive(Debug, Clone)]
pub struct FileSystemContentStore {
    base_path: PathBuf,
}

impl FileSystemContentStore {
    /// Create a new filesystem content store.
    ///
    /// Creates the base directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created or accessed.
    #[tracing::instrument(skip(base_path))]
    pub fn new(base_path: impl Into<PathBuf>) -> KevimageResult<Self> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        tracing::info!(path = %base_path.display(), "Opened filesystem content store");
        Ok(Self { base_path })
    }

    /// Root directory of the store.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Path of the object stored under `key`.
    pub fn path_for(&self, key: &ContentKey) -> PathBuf {
        self.base_path.join(key.as_str())
    }

    fn temp_path_for(&self, key: &ContentKey) -> PathBuf {
        self.base_path
            .join(format!(".{}.{}.tmp", key.as_str(), Uuid::new_v4()))
    }

    async fn write_durably(path: &Path, data: &[u8]) -> std::io::Result<()> {
        let mut file = tokio::fs::File::create(path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        Ok(())
    }

    /// Flush the directory so a renamed object's entry survives a crash.
    async fn sync_dir(&self) -> std::io::Result<()> {
        #[cfg(unix)]
        {
            let dir = tokio::fs::File::open(&self.base_path).await?;
            dir.sync_all().await?;
        }
        Ok(())
    }

    fn write_error(context: impl std::fmt::Display, e: std::io::Error) -> StorageError {
        StorageError::new(StorageErrorKind::FileWrite(format!("{}: {}", context, e)))
    }
}

#[async_trait::async_trait]
impl ContentStore for FileSystemContentStore {
    #[tracing::instrument(skip(self, data), fields(key = %key, size = data.len()))]
    async fn write(&self, key: &ContentKey, data: &[u8]) -> KevimageResult<WriteOutcome> {
        if !key.matches(data) {
            return Err(StorageError::new(StorageErrorKind::InvalidKey(format!(
                "{} does not match the digest of the supplied bytes",
                key
            )))
            .into());
        }

        let path = self.path_for(key);

        if tokio::fs::try_exists(&path)
            .await
            .map_err(|e| Self::write_error(path.display(), e))?
        {
            tracing::debug!(path = %path.display(), "Object already stored");
            return Ok(WriteOutcome::AlreadyPresent);
        }

        let temp_path = self.temp_path_for(key);
        if let Err(e) = Self::write_durably(&temp_path, data).await {
            // Best effort; the temp name is unique so a leftover is harmless
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(Self::write_error(temp_path.display(), e).into());
        }

        if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(Self::write_error(
                format!("rename {} to {}", temp_path.display(), path.display()),
                e,
            )
            .into());
        }

        self.sync_dir()
            .await
            .map_err(|e| Self::write_error(format!("sync {}", self.base_path.display()), e))?;

        tracing::info!(path = %path.display(), size = data.len(), "Stored object");
        Ok(WriteOutcome::Written)
    }

    #[tracing::instrument(skip(self), fields(key = %key))]
    async fn read(&self, key: &ContentKey) -> KevimageResult<Bytes> {
        let path = self.path_for(key);

        let data = tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::NotFound(key.to_string()))
            } else {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            }
        })?;

        let actual = ContentKey::digest_of(&data);
        if actual != key.digest() {
            return Err(StorageError::new(StorageErrorKind::HashMismatch {
                expected: key.digest().to_string(),
                actual,
            })
            .into());
        }

        tracing::debug!(path = %path.display(), size = data.len(), "Read object");
        Ok(Bytes::from(data))
    }

    #[tracing::instrument(skip(self), fields(key = %key))]
    async fn exists(&self, key: &ContentKey) -> KevimageResult<bool> {
        let path = self.path_for(key);
        tokio::fs::try_exists(&path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                path.display(),
                e
            )))
            .into()
        })
    }
}
