//! Handler policies for the standard route surface.
//!
//! Each handler parses the JSON body, delegates to the capability interface,
//! and shapes the response payload. Failures bubble up as
//! [`CapabilityError`]s for the dispatcher to wrap.

use crate::capabilities::{CapabilityError, WorkspaceCapabilities};
use crate::routes::RouteHandler;
use async_trait::async_trait;
use bridge_protocol::payloads::{
    BridgeLink, DirChild, ExecRequest, ExecResponse, HealthResponse, ListDirRequest,
    ListDirResponse, PathPayload, ReadFileRequest, ReadFileResponse, TransferPayload,
    WorkspaceInfoResponse, WriteFileRequest, WriteFileResponse,
};
use bridge_protocol::{Route, BRIDGE_VERSION};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Handler for one [`Route`] variant, backed by the capability object.
///
/// Dispatch is a match on the variant, so adding a route without a handler
/// arm is a compile error.
pub struct CapabilityHandler {
    route: Route,
    caps: Arc<dyn WorkspaceCapabilities>,
}

impl CapabilityHandler {
    pub fn new(route: Route, caps: Arc<dyn WorkspaceCapabilities>) -> Self {
        Self { route, caps }
    }
}

#[async_trait]
impl RouteHandler for CapabilityHandler {
    async fn handle(&self, body: Value) -> Result<Value, CapabilityError> {
        let caps = self.caps.as_ref();
        match self.route {
            Route::Health => health(caps).await,
            Route::WorkspaceInfo => workspace_info(caps).await,
            Route::FsRead => read_file(caps, body).await,
            Route::FsWrite => write_file(caps, body).await,
            Route::FsList => list_dir(caps, body).await,
            Route::FsCreateDir => create_dir(caps, body).await,
            Route::FsDelete => delete_entry(caps, body).await,
            Route::FsMove => move_entry(caps, body).await,
            Route::FsCopy => copy_file(caps, body).await,
            Route::ExecCommand => exec_command(caps, body).await,
        }
    }
}

fn parse_body<T: DeserializeOwned>(body: Value) -> Result<T, CapabilityError> {
    serde_json::from_value(body)
        .map_err(|e| CapabilityError::new(format!("Invalid request body: {e}")))
}

fn to_value<T: Serialize>(payload: T) -> Result<Value, CapabilityError> {
    serde_json::to_value(payload)
        .map_err(|e| CapabilityError::new(format!("Response encoding failed: {e}")))
}

/// Join a parent path and child name, collapsing repeated slashes.
fn join_normalized(parent: &str, name: &str) -> String {
    let joined = format!("{parent}/{name}");
    let mut out = String::with_capacity(joined.len());
    let mut prev_slash = false;
    for ch in joined.chars() {
        if ch == '/' {
            if !prev_slash {
                out.push(ch);
            }
            prev_slash = true;
        } else {
            out.push(ch);
            prev_slash = false;
        }
    }
    out
}

async fn read_file(
    caps: &dyn WorkspaceCapabilities,
    body: Value,
) -> Result<Value, CapabilityError> {
    let req: ReadFileRequest = parse_body(body)?;
    let content = caps.read_file(&req.path, &req.encoding).await?;
    to_value(ReadFileResponse {
        content,
        path: req.path,
    })
}

async fn write_file(
    caps: &dyn WorkspaceCapabilities,
    body: Value,
) -> Result<Value, CapabilityError> {
    let req: WriteFileRequest = parse_body(body)?;
    caps.write_file(&req.path, &req.content).await?;
    to_value(WriteFileResponse {
        size: req.content.encode_utf16().count(),
        path: req.path,
    })
}

async fn list_dir(
    caps: &dyn WorkspaceCapabilities,
    body: Value,
) -> Result<Value, CapabilityError> {
    let req: ListDirRequest = parse_body(body)?;
    // TODO: honor `recursive` once the capability interface exposes a tree
    // listing; today the flag is accepted and a single level is returned.
    let children = caps.read_dir(&req.path).await?;
    let files = children
        .into_iter()
        .map(|child| DirChild {
            path: join_normalized(&req.path, &child.filename),
            name: child.filename,
            kind: child.kind,
        })
        .collect();
    to_value(ListDirResponse { files })
}

async fn create_dir(
    caps: &dyn WorkspaceCapabilities,
    body: Value,
) -> Result<Value, CapabilityError> {
    let req: PathPayload = parse_body(body)?;
    caps.create_dir(&req.path).await?;
    to_value(req)
}

/// Two-phase delete: try the file capability first, fall back to the
/// directory capability, fail only if both refuse.
async fn delete_entry(
    caps: &dyn WorkspaceCapabilities,
    body: Value,
) -> Result<Value, CapabilityError> {
    let req: PathPayload = parse_body(body)?;
    if let Err(file_err) = caps.delete_file(&req.path).await {
        debug!(path = %req.path, error = %file_err, "File delete failed, trying directory");
        caps.delete_dir(&req.path).await?;
    }
    to_value(req)
}

async fn move_entry(
    caps: &dyn WorkspaceCapabilities,
    body: Value,
) -> Result<Value, CapabilityError> {
    let req: TransferPayload = parse_body(body)?;
    caps.move_entry(&req.from, &req.to).await?;
    to_value(req)
}

async fn copy_file(
    caps: &dyn WorkspaceCapabilities,
    body: Value,
) -> Result<Value, CapabilityError> {
    let req: TransferPayload = parse_body(body)?;
    caps.copy_file(&req.from, &req.to).await?;
    to_value(req)
}

async fn exec_command(
    caps: &dyn WorkspaceCapabilities,
    body: Value,
) -> Result<Value, CapabilityError> {
    let req: ExecRequest = parse_body(body)?;
    let outcome = caps.execute(&req.command, &req.options.env).await?;
    to_value(ExecResponse {
        command: req.command,
        exit_code: outcome.exit_code,
        output: outcome.output,
    })
}

async fn health(caps: &dyn WorkspaceCapabilities) -> Result<Value, CapabilityError> {
    let workspace = caps.current_workspace().await?;
    to_value(HealthResponse {
        version: BRIDGE_VERSION.to_string(),
        status: "running".to_string(),
        workspace: workspace.title,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

async fn workspace_info(caps: &dyn WorkspaceCapabilities) -> Result<Value, CapabilityError> {
    let user = caps.current_user().await?;
    let workspace = caps.current_workspace().await?;
    to_value(WorkspaceInfoResponse {
        workspace: workspace.into(),
        bridge: BridgeLink {
            status: "connected".to_string(),
        },
        user,
    })
}
