//! JSON request/response bodies for each route.
//!
//! Field names follow the emulated HTTP surface (camelCase on the wire).
//! Handlers deserialize the request body into one of these and serialize the
//! response struct back into the success envelope's `data` field.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn default_encoding() -> String {
    "utf8".to_string()
}

fn default_list_path() -> String {
    ".".to_string()
}

// =============================================================================
// FILE SYSTEM ROUTES
// =============================================================================

/// `POST /api/fs/read` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadFileRequest {
    pub path: String,
    #[serde(default = "default_encoding")]
    pub encoding: String,
}

/// `POST /api/fs/read` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadFileResponse {
    pub content: String,
    pub path: String,
}

/// `POST /api/fs/write` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteFileRequest {
    pub path: String,
    pub content: String,
}

/// `POST /api/fs/write` response. `size` is the UTF-16 code unit count of
/// the written content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteFileResponse {
    pub path: String,
    pub size: usize,
}

/// `POST /api/fs/list` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListDirRequest {
    #[serde(default = "default_list_path")]
    pub path: String,
    /// Accepted for compatibility; the listing is always single-level.
    #[serde(default)]
    pub recursive: bool,
}

/// Whether a directory child is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// One child in a directory listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirChild {
    pub name: String,
    /// Parent path joined with the child name, repeated slashes collapsed.
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

/// `POST /api/fs/list` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListDirResponse {
    pub files: Vec<DirChild>,
}

/// `POST /api/fs/create-dir` and `POST /api/fs/delete` request/response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathPayload {
    pub path: String,
}

/// `POST /api/fs/move` and `POST /api/fs/copy` request/response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferPayload {
    pub from: String,
    pub to: String,
}

// =============================================================================
// EXEC ROUTE
// =============================================================================

/// `POST /api/exec/command` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecRequest {
    pub command: String,
    #[serde(default)]
    pub options: ExecOptions,
}

/// Execution options; only the environment is honored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecOptions {
    #[serde(default)]
    pub env: HashMap<String, String>,
}

/// `POST /api/exec/command` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecResponse {
    pub command: String,
    pub exit_code: i32,
    pub output: String,
}

// =============================================================================
// STATUS ROUTES
// =============================================================================

/// `GET /health` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub version: String,
    pub status: String,
    pub workspace: String,
    /// RFC 3339 timestamp of the health check.
    pub timestamp: String,
}

/// User descriptor as reported by the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub username: String,
    pub id: String,
}

/// Workspace descriptor as reported by the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceDescriptor {
    pub id: String,
    pub title: String,
    pub description: String,
    pub slug: String,
    pub url: String,
}

/// Workspace summary on the wire; `language` carries the workspace slug.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub language: String,
    pub url: String,
}

impl From<WorkspaceDescriptor> for WorkspaceSummary {
    fn from(d: WorkspaceDescriptor) -> Self {
        Self {
            id: d.id,
            title: d.title,
            description: d.description,
            language: d.slug,
            url: d.url,
        }
    }
}

/// Bridge connectivity as seen from inside the host context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeLink {
    pub status: String,
}

/// `GET /api/workspace/info` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceInfoResponse {
    pub workspace: WorkspaceSummary,
    pub bridge: BridgeLink,
    pub user: UserInfo,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_read_request_default_encoding() {
        let req: ReadFileRequest = serde_json::from_value(json!({"path": "/a.txt"})).unwrap();
        assert_eq!(req.encoding, "utf8");
    }

    #[test]
    fn test_list_request_defaults() {
        let req: ListDirRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(req.path, ".");
        assert!(!req.recursive);
    }

    #[test]
    fn test_dir_child_type_field() {
        let child = DirChild {
            name: "src".into(),
            path: "/d/src".into(),
            kind: EntryKind::Directory,
        };
        let v = serde_json::to_value(&child).unwrap();
        assert_eq!(v["type"], json!("directory"));
    }

    #[test]
    fn test_exec_response_camel_case() {
        let resp = ExecResponse {
            command: "ls".into(),
            exit_code: 0,
            output: String::new(),
        };
        let v = serde_json::to_value(&resp).unwrap();
        assert!(v.get("exitCode").is_some());
        assert!(v.get("exit_code").is_none());
    }

    #[test]
    fn test_exec_request_without_options() {
        let req: ExecRequest = serde_json::from_value(json!({"command": "ls"})).unwrap();
        assert!(req.options.env.is_empty());
    }

    #[test]
    fn test_workspace_summary_language_from_slug() {
        let desc = WorkspaceDescriptor {
            id: "w1".into(),
            title: "demo".into(),
            description: String::new(),
            slug: "rust".into(),
            url: "https://example.com/w1".into(),
        };
        let summary = WorkspaceSummary::from(desc);
        assert_eq!(summary.language, "rust");
    }
}
