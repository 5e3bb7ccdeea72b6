//! `serve` command handler.

use kevimage_error::KevimageResult;
use kevimage_server::{ServiceContext, serve};

/// Serve HTTP on the configured address until shut down.
pub async fn run_server(context: ServiceContext) -> KevimageResult<()> {
    let addr = context.config().bind_addr();
    tracing::info!(%addr, "Starting Kevimage. Press Ctrl+C to stop.");
    serve(context, &addr).await
}
