//! Content-addressed artifact storage for Kevimage.
//!
//! Compressed artifacts are stored under their [`ContentKey`]
//! (`<sha256-hex>.<ext>`), so identical bytes are stored once no matter how
//! many source URLs produced them.
//!
//! # Features
//!
//! - **Content-addressed**: the key is derived from the bytes and verified on read
//! - **Write-once**: writing an existing key is a no-op
//! - **Atomic writes**: temp file, `fsync`, rename into place, then `fsync` the directory
//!
//! # Example
//!
//! ```rust,no_run
//! use kevimage_core::{ContentKey, OutputFormat};
//! use kevimage_storage::{ContentStore, FileSystemContentStore, WriteOutcome};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = FileSystemContentStore::new("/tmp/kevimage-cache")?;
//! let data = b"jpeg bytes";
//! let key = ContentKey::derive(data, OutputFormat::Jpeg);
//!
//! let outcome = store.write(&key, data).await?;
//! assert!(matches!(outcome, WriteOutcome::Written | WriteOutcome::AlreadyPresent));
//!
//! let stored = store.read(&key).await?;
//! assert_eq!(&stored[..], data);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod filesystem;
mod store;

pub use filesystem::FileSystemContentStore;
pub use kevimage_core::ContentKey;
pub use kevimage_error::{StorageError, StorageErrorKind};
pub use store::{ContentStore, WriteOutcome};
