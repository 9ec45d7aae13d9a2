//! Correlated request/response transport over the bus.

use crate::pending::PendingRequestStore;
use bridge_bus::{
    BridgeEvent, EventFilter, EventPublisher, EventTopic, InMemoryEventBus, Subscription,
};
use bridge_protocol::{Method, RequestEnvelope, ResponseEnvelope};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Transport-level failures. These are the only faults a caller sees
/// natively; everything the host reports comes back inside an envelope.
#[derive(Debug, Error)]
pub enum TransportError {
    /// No matching response arrived within the bound.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The pending entry vanished before a response arrived (store swept it
    /// or the router shut down).
    #[error("response channel closed")]
    ChannelClosed,
}

/// Caller-side sender: publishes requests and suspends on the continuation
/// map until the correlated response lands or the timeout fires.
pub struct MessageTransport {
    bus: Arc<InMemoryEventBus>,
    pending: Arc<PendingRequestStore>,
}

impl MessageTransport {
    pub fn new(bus: Arc<InMemoryEventBus>, pending: Arc<PendingRequestStore>) -> Self {
        Self { bus, pending }
    }

    /// Send one request and wait for its response.
    ///
    /// Timeout and completion are mutually exclusive: the timeout path
    /// removes the pending entry, so a response arriving afterwards is
    /// unmatched and dropped by the router.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: serde_json::Value,
        timeout: Option<Duration>,
    ) -> Result<ResponseEnvelope, TransportError> {
        let label = format!("{method} {path}");
        let timeout = timeout.unwrap_or(self.pending.default_timeout());
        let (correlation_id, rx) = self.pending.register(&label, Some(timeout));

        let request = RequestEnvelope {
            id: correlation_id,
            method,
            path: path.to_string(),
            body,
        };

        let receivers = self.bus.publish(BridgeEvent::Request(request)).await;
        if receivers == 0 {
            // Nobody is listening yet; the bounded wait below decides.
            warn!(correlation_id = %correlation_id, "Request published with no listener");
        }

        debug!(correlation_id = %correlation_id, label, "Sent request");

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(_)) => Err(TransportError::ChannelClosed),
            Err(_) => {
                self.pending.cancel(&correlation_id);
                Err(TransportError::Timeout(timeout))
            }
        }
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.pending_count()
    }
}

/// Completes pending entries from response traffic on the bus.
///
/// Responses whose id matches no pending entry are dropped; that is the
/// normal fate of a response that lost its race against the timeout.
pub struct ResponseRouter {
    pending: Arc<PendingRequestStore>,
    /// Taken out at construction so responses published before `run` is
    /// polled are already buffered for it.
    sub: Subscription,
}

impl ResponseRouter {
    pub fn new(bus: &InMemoryEventBus, pending: Arc<PendingRequestStore>) -> Self {
        let sub = bus.subscribe(EventFilter::topic(EventTopic::Response));
        Self { pending, sub }
    }

    /// Run until the shutdown signal flips or the bus closes.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let Self { pending, mut sub } = self;
        info!("Response router started");

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                event = sub.recv() => {
                    match event {
                        Some(BridgeEvent::Response(response)) => {
                            pending.complete(response);
                        }
                        Some(_) => {}
                        None => {
                            warn!("Bus closed, stopping response router");
                            break;
                        }
                    }
                }
            }
        }

        info!("Response router stopped");
    }
}
