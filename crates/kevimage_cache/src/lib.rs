//! Request-facing cache coordinator for Kevimage.
//!
//! [`CacheCoordinator::resolve`] serves an indexed artifact when one exists and
//! otherwise drives the fetch-and-compress pipeline, running at most one
//! production per source URL no matter how many callers ask for it at once.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod coordinator;

pub use coordinator::{CacheCoordinator, Resolution};
pub use kevimage_core::CacheStatus;
