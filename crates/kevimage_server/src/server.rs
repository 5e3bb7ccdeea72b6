//! Listener lifecycle.

use crate::{AppState, ServiceContext, create_router};
use kevimage_error::{KevimageResult, ServerError, ServerErrorKind};
use tracing::{info, warn};

/// Bind `addr`, serve until a shutdown signal, then drain in-flight
/// productions and close the context.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server loop fails.
/// The context is closed in both cases once serving has started.
#[tracing::instrument(skip(context))]
pub async fn serve(context: ServiceContext, addr: &str) -> KevimageResult<()> {
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        ServerError::new(ServerErrorKind::Bind {
            addr: addr.to_string(),
            reason: e.to_string(),
        })
    })?;

    let local = listener
        .local_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| addr.to_string());
    info!(addr = %local, "Kevimage listening");

    let app = create_router(AppState::from(&context));
    let outcome = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::new(ServerErrorKind::Serve(e.to_string())));

    info!("Listener closed, draining");
    context.shutdown().await;

    Ok(outcome?)
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Ctrl+C received"),
        _ = terminate => info!("SIGTERM received"),
    }
}
