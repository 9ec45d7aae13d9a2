//! Request and response envelopes exchanged across the context boundary.
//!
//! The caller on the far side of the boundary can only observe structured
//! messages, never native faults, so every dispatcher outcome is folded into
//! an [`Envelope`] before it crosses.

use crate::correlation::CorrelationId;
use crate::method::Method;
use serde::{Deserialize, Serialize};

/// Wire-level request: `{id, method, path, body}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Correlation id echoed by the matching response.
    pub id: CorrelationId,
    pub method: Method,
    pub path: String,
    /// JSON request body; `Null` when the caller sent none.
    pub body: serde_json::Value,
}

impl RequestEnvelope {
    /// Build a request with a fresh correlation id.
    pub fn new(method: Method, path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            id: CorrelationId::new(),
            method,
            path: path.into(),
            body,
        }
    }
}

/// Whether the dispatcher reported success or failure for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// Wire-level response: `{id, status, payload}`.
///
/// Invariant: `id` matches exactly one previously sent [`RequestEnvelope`].
/// Responses whose id matches no pending request are dropped by the receiver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub id: CorrelationId,
    pub status: ResponseStatus,
    pub payload: Envelope,
}

impl ResponseEnvelope {
    /// Wrap a handler result under the request's correlation id.
    pub fn success(id: CorrelationId, data: serde_json::Value) -> Self {
        Self {
            id,
            status: ResponseStatus::Success,
            payload: Envelope::ok(data),
        }
    }

    /// Wrap a handler failure under the request's correlation id.
    pub fn failure(id: CorrelationId, message: impl Into<String>) -> Self {
        Self {
            id,
            status: ResponseStatus::Error,
            payload: Envelope::err(message),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }
}

/// The `{success, data | error}` structure the emulated HTTP surface returns
/// as its JSON body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    /// Present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Present on failure; the capability's message verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    /// Success envelope carrying a handler's return value.
    pub fn ok(data: serde_json::Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Error envelope carrying a failure message.
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}
