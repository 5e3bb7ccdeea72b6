//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the kevimage binary.

mod commands;
mod resolve;
mod serve;

pub use commands::{Cli, Commands};
pub use resolve::resolve_url;
pub use serve::run_server;
