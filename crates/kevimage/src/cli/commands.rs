//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Kevimage - fetch, compress and cache remote images by URL
#[derive(Parser, Debug)]
#[command(name = "kevimage")]
#[command(about = "Fetch, compress and cache remote images by URL", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file, replacing ./kevimage.toml
    #[arg(short, long, global = true, env = "KEVIMAGE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP service
    Serve {
        /// Interface to bind, overriding `server.host`
        #[arg(long)]
        host: Option<String>,

        /// Port to bind, overriding `server.port`
        #[arg(long)]
        port: Option<u16>,
    },

    /// Resolve one URL through the cache and report the result
    Resolve {
        /// Source image URL
        url: String,

        /// Write the compressed bytes to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
