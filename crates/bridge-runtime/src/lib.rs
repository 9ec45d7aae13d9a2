//! # Bridge Runtime - Lifecycle and Wiring
//!
//! Composes the bridge from its parts, in dependency order:
//!
//! 1. Event bus (the shared channel)
//! 2. Host side: route table, dispatcher, request listener
//! 3. Caller side: pending store, response router, transport, fetch
//! 4. Discovery metadata published for external tooling
//! 5. Heartbeat tick (stub)
//!
//! There is no ambient global; the process entry point owns one [`Bridge`]
//! and hands its fetch handle to whoever needs it.

pub mod bridge;
pub mod config;
pub mod discovery;

pub use bridge::{Bridge, BridgeError};
pub use config::{BridgeConfig, ConfigError};
