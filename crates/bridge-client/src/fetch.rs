//! Fetch interception as a transport-selection strategy.
//!
//! Instead of patching an ambient network primitive, callers are handed a
//! [`BridgeFetch`]: calls whose URL sits under the reserved local origin are
//! carried over the bridge transport, everything else is delegated to the
//! wrapped inner fetch untouched.

use crate::transport::{MessageTransport, TransportError};
use crate::FETCH_TIMEOUT;
use async_trait::async_trait;
use bridge_protocol::Method;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Minimal outgoing HTTP call description.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    /// Raw body as the caller provided it.
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Synthesized or passed-through HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    /// JSON text of the envelope for bridged calls.
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Failures surfaced to the caller as native faults.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The bridged call produced no response within the bound. The one
    /// bridge failure that cannot be an envelope, because there is no
    /// response to wrap.
    #[error("bridge request timed out after {0:?}")]
    Timeout(Duration),

    /// The bridge transport failed before a response existed.
    #[error("bridge transport failed: {0}")]
    Transport(TransportError),

    /// The inner fetch failed for a passed-through call.
    #[error("network error: {0}")]
    Network(String),

    /// Response payload could not be encoded.
    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// The real network primitive behind the interceptor.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, FetchError>;
}

/// Fetch implementation that forwards reserved-origin calls to the bridge.
///
/// Strictly a superset of the inner fetch: any URL outside the reserved
/// origin is delegated unchanged.
pub struct BridgeFetch {
    origin: String,
    timeout: Duration,
    transport: Arc<MessageTransport>,
    inner: Arc<dyn HttpFetch>,
}

impl BridgeFetch {
    pub fn new(
        origin: impl Into<String>,
        transport: Arc<MessageTransport>,
        inner: Arc<dyn HttpFetch>,
    ) -> Self {
        Self {
            origin: origin.into(),
            timeout: FETCH_TIMEOUT,
            transport,
            inner,
        }
    }

    /// Override the bounded wait (for tests).
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn bridged_path<'a>(&self, url: &'a str) -> Option<&'a str> {
        let rest = url.strip_prefix(&self.origin)?;
        if rest.is_empty() {
            Some("/")
        } else if rest.starts_with('/') {
            Some(rest)
        } else {
            // Same prefix but a different host, e.g. localhost:30021.
            None
        }
    }

    async fn forward(&self, request: HttpRequest, path: &str) -> Result<HttpResponse, FetchError> {
        // String bodies are parsed as JSON; anything unparsable is forwarded
        // as a raw string rather than rejected.
        let body = match request.body {
            Some(raw) => serde_json::from_str(&raw)
                .unwrap_or_else(|_| serde_json::Value::String(raw)),
            None => serde_json::Value::Null,
        };

        debug!(method = %request.method, path, "Forwarding call over bridge");

        let response = self
            .transport
            .send(request.method, path, body, Some(self.timeout))
            .await
            .map_err(|e| match e {
                TransportError::Timeout(bound) => FetchError::Timeout(bound),
                other => FetchError::Transport(other),
            })?;

        let status = if response.is_success() { 200 } else { 500 };
        Ok(HttpResponse {
            status,
            body: serde_json::to_string(&response.payload)?,
        })
    }
}

#[async_trait]
impl HttpFetch for BridgeFetch {
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, FetchError> {
        match self.bridged_path(&request.url) {
            Some(path) => {
                let path = path.to_string();
                self.forward(request, &path).await
            }
            None => self.inner.fetch(request).await,
        }
    }
}
