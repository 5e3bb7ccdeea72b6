//! Kevimage binary.
//!
//! - `kevimage serve` runs the HTTP service
//! - `kevimage resolve <URL>` runs one URL through the cache

use clap::Parser;
use kevimage_server::{KevimageConfig, ServiceContext, init_logging};

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, resolve_url, run_server};

    // Variables from .env become visible to the environment config layer
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = KevimageConfig::load(cli.config.as_deref())?;
    if let Commands::Serve { host, port } = &cli.command {
        if let Some(host) = host {
            config.server.host = host.clone();
        }
        if let Some(port) = port {
            config.server.port = *port;
        }
    }

    init_logging(&config.logging, cli.verbose)?;
    tracing::debug!(?config, "Configuration loaded");

    let context = ServiceContext::initialize(&config)?;

    match cli.command {
        Commands::Serve { .. } => {
            run_server(context).await?;
        }

        Commands::Resolve { url, output } => {
            resolve_url(context, &url, output.as_deref()).await?;
        }
    }

    Ok(())
}
