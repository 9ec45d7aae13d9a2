//! # Bridge Client - Caller Side of the Bridge
//!
//! Lives in the sandboxed context. Outgoing calls to the reserved local
//! origin are rewritten into correlated bus messages; everything else goes
//! to the real network primitive untouched.
//!
//! ## Call Path
//!
//! ```text
//! caller ──→ BridgeFetch ──matches origin?──→ MessageTransport ──→ Bus
//!                │                                  │
//!                │ no                               │ oneshot, bounded wait
//!                ▼                                  ▼
//!           inner HttpFetch                 PendingRequestStore
//! ```
//!
//! The transport suspends each call on a oneshot channel keyed by
//! correlation id; the response router completes it when the matching
//! response arrives, and the timeout path cancels it. Whichever fires first
//! wins, exactly once.

pub mod fetch;
pub mod pending;
pub mod transport;

// Re-export main types
pub use fetch::{BridgeFetch, FetchError, HttpFetch, HttpRequest, HttpResponse};
pub use pending::{PendingRequestStore, PendingStats};
pub use transport::{MessageTransport, ResponseRouter, TransportError};

use std::time::Duration;

/// Bound on every intercepted call's wait for a response.
pub const FETCH_TIMEOUT: Duration = Duration::from_millis(10_000);
