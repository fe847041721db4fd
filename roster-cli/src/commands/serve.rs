//! Serve command - run the HTTP API

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;

use super::load_config;
use roster_core::adapters::http;
use roster_core::services::ImportOptions;
use roster_core::RosterContext;

pub fn run(bind: Option<String>, seed: Option<PathBuf>) -> Result<()> {
    let mut config = load_config()?;
    if let Some(addr) = bind {
        config.server.bind_address = addr;
    }

    let ctx = RosterContext::new(config);

    if let Some(path) = seed {
        let result = ctx
            .import_service
            .import_file(&path, ImportOptions::default())
            .with_context(|| format!("Failed to seed from {:?}", path))?;
        tracing::info!(
            file = ?path,
            added = result.added,
            skipped = result.skipped,
            "seeded store"
        );
    }

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(serve(Arc::new(ctx)))
}

async fn serve(ctx: Arc<RosterContext>) -> Result<()> {
    let addr = ctx.config.server.bind_address.clone();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    http::serve(ctx, listener, shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
