//! Request dispatcher: route lookup plus outcome normalization.

use crate::routes::RouteTable;
use bridge_protocol::{Envelope, Method, RequestEnvelope, ResponseEnvelope, ResponseStatus};
use tracing::debug;

/// Resolves `(method, path, body)` against the route table and folds every
/// outcome into an envelope.
///
/// The caller on the other side of the boundary can only observe structured
/// messages, so no handler failure ever propagates as a fault from here.
pub struct RequestDispatcher {
    routes: RouteTable,
}

impl RequestDispatcher {
    pub fn new(routes: RouteTable) -> Self {
        Self { routes }
    }

    /// Dispatch one request; always returns an envelope.
    pub async fn dispatch(&self, method: Method, path: &str, body: serde_json::Value) -> Envelope {
        let Some(handler) = self.routes.resolve(method, path) else {
            debug!(%method, path, "No route registered");
            return Envelope::err(format!("Route not found: {method} {path}"));
        };

        match handler.handle(body).await {
            Ok(data) => Envelope::ok(data),
            Err(e) => Envelope::err(e.to_string()),
        }
    }

    /// Dispatch a wire request and stamp the response with its id.
    pub async fn dispatch_envelope(&self, request: RequestEnvelope) -> ResponseEnvelope {
        let id = request.id;
        let envelope = self
            .dispatch(request.method, &request.path, request.body)
            .await;
        let status = if envelope.success {
            ResponseStatus::Success
        } else {
            ResponseStatus::Error
        };
        ResponseEnvelope {
            id,
            status,
            payload: envelope,
        }
    }
}
