//! Core data types and collaborator traits for the Kevimage compression cache.
//!
//! This crate provides the foundation types shared by the content store, the
//! metadata index, the fetch/compress pipeline and the cache coordinator.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod artifact;
mod content_key;
mod format;
mod record;
mod traits;

pub use artifact::{Artifact, CacheStatus};
pub use content_key::ContentKey;
pub use format::OutputFormat;
pub use record::{ImageRecord, ImageRecordBuilder, NewImageRecord, NewImageRecordBuilder};
pub use traits::{Compressor, Fetcher, MetadataIndex};
