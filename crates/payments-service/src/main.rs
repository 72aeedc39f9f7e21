//! Payments service binary
//!
//! Serves `/pay` and `/` until SIGINT/SIGTERM, then drains connections.

mod config;
mod logger;

use anyhow::Context;
use clap::Parser;
use config::ServiceConfig;
use payments_core::{Server, ServerState};
use std::sync::Arc;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::parse();
    logger::init_logger(config.log_format, config.verbose);
    config.validate()?;

    tracing::debug!(?config, "configuration loaded");

    let server_config = config.server_config();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(server_config.workers)
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    runtime.block_on(async move {
        let state = Arc::new(ServerState::payments().context("failed to register routes")?);
        let server = Server::bind(&server_config, state).context("failed to start listener")?;

        server
            .serve_with_graceful_shutdown(shutdown_signal(), server_config.shutdown_timeout)
            .await;

        tracing::info!("payments service stopped");
        Ok::<(), anyhow::Error>(())
    })
}

/// Resolves on Ctrl-C, or SIGTERM on Unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
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
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl-C"),
        _ = terminate => tracing::info!("received SIGTERM"),
    }
}
