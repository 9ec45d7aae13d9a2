//! # Bridge Protocol - Wire Types for the Workspace Bridge
//!
//! Everything that crosses the context boundary is defined here: request and
//! response envelopes, the emulated HTTP route surface, correlation ids, and
//! the discovery metadata descriptor.
//!
//! ## Message Flow
//!
//! ```text
//! ┌──────────────┐  RequestEnvelope   ┌──────────────┐
//! │ Caller side  │ ─────────────────→ │  Host side   │
//! │ (sandboxed)  │                    │ (privileged) │
//! │              │ ←───────────────── │              │
//! └──────────────┘  ResponseEnvelope  └──────────────┘
//! ```
//!
//! Both sides depend on this crate and nothing else shared; the caller side
//! never sees host capability types, only JSON payloads.

pub mod correlation;
pub mod envelope;
pub mod metadata;
pub mod method;
pub mod payloads;
pub mod routes;

// Re-export main types
pub use correlation::CorrelationId;
pub use envelope::{Envelope, RequestEnvelope, ResponseEnvelope, ResponseStatus};
pub use metadata::{BridgeMetadata, BRIDGE_STATUS_ACTIVE};
pub use method::{Method, MethodParseError};
pub use routes::Route;

/// Version string reported by the health route.
pub const BRIDGE_VERSION: &str = "1.0.0";

/// Port of the emulated local API origin.
pub const LOCAL_API_PORT: u16 = 3002;
