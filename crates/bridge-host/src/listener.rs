//! Host-side bus listener: services request traffic.

use crate::dispatcher::RequestDispatcher;
use bridge_bus::{
    BridgeEvent, EventFilter, EventPublisher, EventTopic, InMemoryEventBus, Subscription,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// Subscribes to request traffic and publishes a response for each request.
///
/// Every request is serviced on its own task; a slow handler never blocks
/// later requests, and responses come back in whatever order handlers
/// finish. Correlation ids, not channel order, pair them up again.
pub struct RequestListener {
    bus: Arc<InMemoryEventBus>,
    dispatcher: Arc<RequestDispatcher>,
    /// Taken out at construction so requests published before `run` is
    /// polled are already buffered for it.
    sub: Subscription,
}

impl RequestListener {
    pub fn new(bus: Arc<InMemoryEventBus>, dispatcher: Arc<RequestDispatcher>) -> Self {
        let sub = bus.subscribe(EventFilter::topic(EventTopic::Request));
        Self {
            bus,
            dispatcher,
            sub,
        }
    }

    /// Run until the shutdown signal flips or the bus closes.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let Self {
            bus,
            dispatcher,
            mut sub,
        } = self;
        info!("Request listener started");

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                event = sub.recv() => {
                    match event {
                        Some(BridgeEvent::Request(request)) => {
                            let dispatcher = Arc::clone(&dispatcher);
                            let bus = Arc::clone(&bus);
                            tokio::spawn(async move {
                                let response = dispatcher.dispatch_envelope(request).await;
                                bus.publish(BridgeEvent::Response(response)).await;
                            });
                        }
                        Some(_) => {}
                        None => {
                            warn!("Bus closed, stopping request listener");
                            break;
                        }
                    }
                }
            }
        }

        info!("Request listener stopped");
    }
}
