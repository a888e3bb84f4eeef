//! HTTP listener and shutdown wiring

use anyhow::Result;
use axum::Router;
use std::future::Future;
use streamer_core::Config;
use tokio_util::sync::CancellationToken;

/// Serve `app` until SIGINT/SIGTERM, then cancel `shutdown`.
pub async fn start_server(config: &Config, app: Router, shutdown: CancellationToken) -> Result<()> {
    let addr = config.server_addr();
    tracing::info!(addr = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        max_upload_mb = config.max_upload_bytes / 1024 / 1024,
        chunk_size_bytes = config.chunk_size_bytes,
        environment = %config.environment,
        "Server ready and accepting connections"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    Ok(())
}

/// Wait for SIGINT or SIGTERM, then cancel `shutdown`.
async fn shutdown_signal(shutdown: CancellationToken) {
    cancel_on(termination(), shutdown).await;
}

/// Cancel `shutdown` once `signal` resolves. Cancelling aborts every in-flight writer.
async fn cancel_on(signal: impl Future<Output = ()>, shutdown: CancellationToken) {
    signal.await;
    tracing::info!("Stopping server and cancelling in-flight uploads");
    shutdown.cancel();
}

async fn termination() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C signal"),
        _ = terminate => tracing::info!("Received terminate signal"),
    }
}
