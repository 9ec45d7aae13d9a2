//! # Bridge Host - Privileged Side of the Bridge
//!
//! Receives request envelopes from the bus, resolves them against the route
//! table, executes the matching handler against the workspace capability
//! interface, and publishes the response envelope back.
//!
//! ## Request Path
//!
//! ```text
//! Bus ──Request──→ RequestListener ──→ RequestDispatcher ──→ RouteTable
//!                                            │
//!                                            ▼
//!                                  WorkspaceCapabilities
//!                                            │
//! Bus ←──Response── RequestListener ←────────┘
//! ```
//!
//! Every handler outcome, including a missing route, is folded into a
//! success/error envelope; nothing here panics across the boundary.

pub mod capabilities;
pub mod dispatcher;
pub mod handlers;
pub mod listener;
pub mod routes;

// Re-export main types
pub use capabilities::memory::MemoryWorkspace;
pub use capabilities::{CapabilityError, DirEntryInfo, ExecOutcome, WorkspaceCapabilities};
pub use dispatcher::RequestDispatcher;
pub use listener::RequestListener;
pub use routes::{RouteHandler, RouteTable, RouteTableError};
