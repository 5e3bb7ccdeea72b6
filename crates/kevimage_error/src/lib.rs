//! Error types for the Kevimage compression cache.
//!
//! This crate provides the foundation error types used throughout the Kevimage workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! Every error is `Clone`, so the single outcome of a production run can be
//! handed to every caller waiting on it.
//!
//! # Examples
//!
//! ```
//! use kevimage_error::{KevimageResult, FetchError, FetchErrorKind};
//!
//! fn download() -> KevimageResult<Vec<u8>> {
//!     Err(FetchError::new(FetchErrorKind::Request("connection refused".to_string())))?
//! }
//!
//! let err = download().unwrap_err();
//! assert_eq!(err.code(), "fetch_failed");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod cache;
mod compression;
mod config;
mod database;
mod error;
mod fetch;
mod server;
mod storage;
mod validation;

pub use builder::{BuilderError, BuilderErrorKind};
pub use cache::{CacheError, CacheErrorKind};
pub use compression::CompressionError;
pub use config::ConfigError;
pub use database::{DatabaseError, DatabaseErrorKind};
pub use error::{KevimageError, KevimageErrorKind, KevimageResult};
pub use fetch::{FetchError, FetchErrorKind};
pub use server::{ServerError, ServerErrorKind};
pub use storage::{StorageError, StorageErrorKind};
pub use validation::ValidationError;
