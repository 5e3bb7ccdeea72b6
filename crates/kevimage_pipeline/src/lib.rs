//! Fetch-and-compress pipeline for Kevimage.
//!
//! Turns a cache miss into a stored artifact and an index record:
//! fetch, transcode, hash, store, then index. The store write always
//! completes before the index write, so the index never points at bytes that
//! were not persisted.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod compress;
mod fetch;
mod pipeline;

pub use compress::{DEFAULT_QUALITY, JpegCompressor};
pub use fetch::{HttpFetcher, HttpFetcherConfig, HttpFetcherConfigBuilder};
pub use pipeline::{Pipeline, PipelineBuilder, Produced, corrupt_entry};
