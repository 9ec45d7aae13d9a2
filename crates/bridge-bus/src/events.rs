//! Events carried on the bridge bus.

use bridge_protocol::{CorrelationId, RequestEnvelope, ResponseEnvelope};
use serde::{Deserialize, Serialize};

/// Everything that travels over the bus.
///
/// Exactly two kinds of traffic exist: requests heading toward the host
/// context and responses heading back. Each side subscribes only to the
/// topic it services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BridgeEvent {
    /// A caller-side request awaiting dispatch on the host side.
    Request(RequestEnvelope),
    /// A host-side response for a previously published request.
    Response(ResponseEnvelope),
}

impl BridgeEvent {
    /// Topic used for subscription filtering.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::Request(_) => EventTopic::Request,
            Self::Response(_) => EventTopic::Response,
        }
    }

    /// Correlation id of the envelope inside.
    #[must_use]
    pub fn correlation_id(&self) -> CorrelationId {
        match self {
            Self::Request(req) => req.id,
            Self::Response(resp) => resp.id,
        }
    }
}

/// Topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Caller-to-host traffic.
    Request,
    /// Host-to-caller traffic.
    Response,
    /// All traffic (no filtering).
    All,
}

/// Filter for subscribing to specific traffic.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
}

impl EventFilter {
    /// A filter that accepts every event.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// A filter for one topic.
    #[must_use]
    pub fn topic(topic: EventTopic) -> Self {
        Self {
            topics: vec![topic],
        }
    }

    /// Check whether an event passes this filter.
    #[must_use]
    pub fn matches(&self, event: &BridgeEvent) -> bool {
        self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic())
    }
}
