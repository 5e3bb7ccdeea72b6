//! HTTP service, configuration and lifecycle for Kevimage.
//!
//! - [`KevimageConfig`]: layered TOML/environment configuration
//! - [`init_logging`]: `tracing` subscriber setup
//! - [`ServiceContext`]: every long-lived handle, built at startup and closed at shutdown
//! - [`create_router`]: the `/compress` and `/ping` endpoints
//! - [`serve`]: bind, serve until a shutdown signal, then drain

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod context;
mod error;
mod observability;
mod routes;
mod server;

pub use config::{
    CompressionConfig, DatabaseConfig, FetchConfig, KevimageConfig, LoggingConfig, ServerConfig,
    StorageConfig,
};
pub use context::ServiceContext;
pub use error::ApiError;
pub use observability::init_logging;
pub use routes::{AppState, create_router};
pub use server::{serve, shutdown_signal};
