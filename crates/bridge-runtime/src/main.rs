//! Workbridge demo binary.
//!
//! Wires a bridge over an in-memory workspace and exercises the emulated
//! API from the caller side, then idles until interrupted. Real embeddings
//! supply their own [`WorkspaceCapabilities`] implementation and inner
//! fetch; this binary exists to show the wiring and to smoke-test a build.

use anyhow::{Context, Result};
use async_trait::async_trait;
use bridge_client::{FetchError, HttpFetch, HttpRequest, HttpResponse};
use bridge_host::MemoryWorkspace;
use bridge_protocol::Method;
use bridge_runtime::{Bridge, BridgeConfig};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Inner fetch for an environment with no real network.
struct OfflineFetch;

#[async_trait]
impl HttpFetch for OfflineFetch {
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, FetchError> {
        Err(FetchError::Network(format!(
            "no outbound network available for {}",
            request.url
        )))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("===========================================");
    info!("  Workbridge v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let workspace = Arc::new(MemoryWorkspace::new());
    workspace.seed_file("/readme.md", "workbridge demo workspace\n");
    workspace.register_command("ls", 0, "readme.md\n");

    let config = BridgeConfig::default();
    let bridge = Bridge::start(config, workspace, Arc::new(OfflineFetch))
        .await
        .context("Failed to start bridge")?;

    let fetch = bridge.fetch();
    let origin = bridge.config().reserved_origin();

    // Exercise the surface once so the log shows a full round trip.
    let health = fetch
        .fetch(HttpRequest::new(Method::Get, format!("{origin}/health")))
        .await
        .context("Health check failed")?;
    info!(status = health.status, body = %health.body, "Health");

    let listing = fetch
        .fetch(
            HttpRequest::new(Method::Post, format!("{origin}/api/fs/list"))
                .with_body(r#"{"path": "/"}"#),
        )
        .await
        .context("Listing failed")?;
    info!(status = listing.status, body = %listing.body, "Root listing");

    info!("Bridge running; press Ctrl-C to stop");
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Signal handler failed, exiting");
    }

    bridge.shutdown();
    Ok(())
}
