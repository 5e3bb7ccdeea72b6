//! Kevimage - URL-addressed image compression cache
//!
//! Kevimage fetches a remote image on first request, transcodes it to JPEG,
//! stores the result under its content hash and serves every later request
//! for the same URL from the cache. Concurrent requests for one URL share a
//! single fetch and transcode.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use kevimage::{KevimageConfig, ServiceContext, serve};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = KevimageConfig::load(None)?;
//!     let context = ServiceContext::initialize(&config)?;
//!     serve(context, &config.bind_addr()).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `kevimage_error` - Error types
//! - `kevimage_core` - Content keys, records, artifacts and collaborator traits
//! - `kevimage_storage` - Content-addressed filesystem store
//! - `kevimage_database` - SQLite metadata index
//! - `kevimage_pipeline` - HTTP fetcher, JPEG compressor and the production pipeline
//! - `kevimage_cache` - Per-URL deduplicating coordinator
//! - `kevimage_server` - Configuration, logging and the HTTP endpoints
//!
//! This crate (`kevimage`) re-exports everything for convenience.

pub use kevimage_cache::*;
pub use kevimage_core::*;
pub use kevimage_database::*;
pub use kevimage_error::*;
pub use kevimage_pipeline::*;
pub use kevimage_server::*;
pub use kevimage_storage::*;
