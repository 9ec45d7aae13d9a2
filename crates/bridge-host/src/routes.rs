//! Route table: `(method, path)` to handler, fixed after startup.

use crate::capabilities::{CapabilityError, WorkspaceCapabilities};
use crate::handlers::CapabilityHandler;
use async_trait::async_trait;
use bridge_protocol::{Method, Route};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// An async handler bound to one route.
#[async_trait]
pub trait RouteHandler: Send + Sync {
    async fn handle(&self, body: serde_json::Value)
        -> Result<serde_json::Value, CapabilityError>;
}

/// Errors from table construction.
#[derive(Debug, Clone, Error)]
pub enum RouteTableError {
    /// The `(method, path)` pair is already registered. Fatal at startup;
    /// the table never silently replaces a handler.
    #[error("duplicate route: {method} {path}")]
    Duplicate { method: Method, path: String },
}

/// Exact-match route lookup. Mutable during registration, read-only after.
#[derive(Default)]
pub struct RouteTable {
    entries: HashMap<(Method, String), Arc<dyn RouteHandler>>,
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the standard surface: every [`Route`] variant gets a handler
    /// backed by the given capability object.
    pub fn standard(caps: Arc<dyn WorkspaceCapabilities>) -> Result<Self, RouteTableError> {
        let mut table = Self::new();
        for route in Route::ALL {
            table.register(
                route.method(),
                route.path(),
                Arc::new(CapabilityHandler::new(route, Arc::clone(&caps))),
            )?;
        }
        Ok(table)
    }

    /// Add a handler for a pair; fails if the pair already exists.
    pub fn register(
        &mut self,
        method: Method,
        path: impl Into<String>,
        handler: Arc<dyn RouteHandler>,
    ) -> Result<(), RouteTableError> {
        let path = path.into();
        let key = (method, path.clone());
        if self.entries.contains_key(&key) {
            return Err(RouteTableError::Duplicate { method, path });
        }
        self.entries.insert(key, handler);
        Ok(())
    }

    /// Exact-match lookup; no pattern or wildcard matching.
    #[must_use]
    pub fn resolve(&self, method: Method, path: &str) -> Option<Arc<dyn RouteHandler>> {
        self.entries.get(&(method, path.to_string())).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
