//! SQLite metadata index for Kevimage.
//!
//! Maps each source URL to the content key, sizes and mime type of its
//! compressed artifact.
//!
//! # Features
//!
//! - Diesel-based SQLite integration with an r2d2 pool
//! - Embedded migrations
//! - Uniqueness on `source_url`, shared content keys allowed
//!
//! # Example
//!
//! ```rust,no_run
//! use kevimage_core::MetadataIndex;
//! use kevimage_database::{SqliteMetadataIndex, create_pool, run_migrations};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("kevimage.db", 8, Duration::from_secs(5))?;
//! run_migrations(&pool)?;
//!
//! let index = SqliteMetadataIndex::new(pool);
//! let record = index.find_by_url("https://example.com/a.png").await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod connection;
mod index;
mod models;

// Public modules for external access
pub mod schema;

pub use connection::{SqlitePool, create_pool, run_migrations};
pub use index::SqliteMetadataIndex;
pub use models::{ImageRow, NewImageRow};

pub use kevimage_error::{DatabaseError, DatabaseErrorKind};

/// Result type for database operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;
