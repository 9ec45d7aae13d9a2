//! The bridge lifecycle object.

use crate::config::{BridgeConfig, ConfigError};
use crate::discovery;
use bridge_bus::InMemoryEventBus;
use bridge_client::pending::cleanup_task;
use bridge_client::{BridgeFetch, HttpFetch, MessageTransport, PendingRequestStore, ResponseRouter};
use bridge_host::{RequestDispatcher, RequestListener, RouteTable, RouteTableError, WorkspaceCapabilities};
use bridge_protocol::BridgeMetadata;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// Startup failures. All fatal; there is no degraded mode.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("route setup failed: {0}")]
    Routes(#[from] RouteTableError),

    #[error("discovery metadata write failed: {0}")]
    Metadata(#[from] std::io::Error),
}

/// A running bridge: both sides wired over one bus, plus background tasks.
///
/// Owned by the process entry point. Dropping it without calling
/// [`Bridge::shutdown`] leaves the background tasks to exit when the
/// runtime goes away.
pub struct Bridge {
    config: BridgeConfig,
    bus: Arc<InMemoryEventBus>,
    transport: Arc<MessageTransport>,
    fetch: Arc<BridgeFetch>,
    metadata_path: PathBuf,
    shutdown_tx: watch::Sender<bool>,
}

impl Bridge {
    /// Wire everything up and publish the discovery descriptor.
    ///
    /// Initialization order: bus, host side (listener), caller side
    /// (router, transport, fetch), then metadata and the heartbeat tick.
    /// Subscriptions are taken before any task is spawned, so a request
    /// issued immediately after `start` returns cannot be lost.
    pub async fn start(
        config: BridgeConfig,
        caps: Arc<dyn WorkspaceCapabilities>,
        inner_fetch: Arc<dyn HttpFetch>,
    ) -> Result<Self, BridgeError> {
        config.validate()?;

        let bus = Arc::new(InMemoryEventBus::with_capacity(config.channel_capacity));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        // Host side.
        let routes = RouteTable::standard(Arc::clone(&caps))?;
        let dispatcher = Arc::new(RequestDispatcher::new(routes));
        let listener = RequestListener::new(Arc::clone(&bus), dispatcher);
        tokio::spawn(listener.run(shutdown_rx.clone()));

        // Caller side.
        let pending = Arc::new(PendingRequestStore::new(config.request_timeout));
        let router = ResponseRouter::new(&bus, Arc::clone(&pending));
        tokio::spawn(router.run(shutdown_rx.clone()));
        tokio::spawn(cleanup_task(Arc::clone(&pending), config.cleanup_interval));

        let transport = Arc::new(MessageTransport::new(Arc::clone(&bus), pending));
        let fetch = Arc::new(
            BridgeFetch::new(config.reserved_origin(), Arc::clone(&transport), inner_fetch)
                .with_timeout(config.fetch_timeout),
        );

        // Discovery metadata.
        let label = caps
            .current_workspace()
            .await
            .map(|w| w.title)
            .unwrap_or_else(|_| "workspace".to_string());
        let metadata = BridgeMetadata::active(config.port, label);
        let metadata_path = discovery::write_descriptor(&config.data_dir, &metadata)?;
        info!(
            port = config.port,
            path = %metadata_path.display(),
            "Bridge metadata published"
        );

        // Liveness tick.
        let heartbeat = config.heartbeat_interval;
        let mut hb_shutdown = shutdown_rx;
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(heartbeat);
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    changed = hb_shutdown.changed() => {
                        if changed.is_err() || *hb_shutdown.borrow() {
                            break;
                        }
                    }
                    _ = tick.tick() => {
                        debug!("Bridge heartbeat");
                    }
                }
            }
        });

        info!(origin = %config.reserved_origin(), "Bridge started");

        Ok(Self {
            config,
            bus,
            transport,
            fetch,
            metadata_path,
            shutdown_tx,
        })
    }

    /// Fetch handle for caller code. Reserved-origin calls go over the
    /// bridge, everything else to the wrapped inner fetch.
    #[must_use]
    pub fn fetch(&self) -> Arc<BridgeFetch> {
        Arc::clone(&self.fetch)
    }

    /// Direct transport handle, bypassing the fetch layer.
    #[must_use]
    pub fn transport(&self) -> Arc<MessageTransport> {
        Arc::clone(&self.transport)
    }

    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    #[must_use]
    pub fn metadata_path(&self) -> &Path {
        &self.metadata_path
    }

    #[must_use]
    pub fn bus(&self) -> &InMemoryEventBus {
        &self.bus
    }

    /// Signal all background tasks to stop.
    pub fn shutdown(&self) {
        info!("Bridge shutting down");
        let _ = self.shutdown_tx.send(true);
    }
}
