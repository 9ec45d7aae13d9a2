//! # Bridge Bus - Shared Message Channel Between Contexts
//!
//! The two sides of the bridge never call each other directly; the only way
//! across the boundary is an asynchronous message on this bus.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │ Caller side  │                    │  Host side   │
//! │              │    publish()       │              │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! Delivery is at-most-once per subscriber: a slow subscriber that falls
//! behind the channel capacity loses the oldest events, and an event
//! published with no subscriber is dropped. There is no retry at this layer.

pub mod bus;
pub mod events;

// Re-export main types
pub use bus::{
    EventPublisher, EventStream, InMemoryEventBus, Subscription, SubscriptionError,
};
pub use events::{BridgeEvent, EventFilter, EventTopic};

/// Maximum events buffered per subscriber before the oldest are dropped.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;
