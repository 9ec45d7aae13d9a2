//! Full-stack scenarios: a started bridge exercised through its fetch
//! handle, with an in-memory workspace on the host side.

use async_trait::async_trait;
use bridge_client::{FetchError, HttpFetch, HttpRequest, HttpResponse};
use bridge_host::MemoryWorkspace;
use bridge_protocol::Method;
use bridge_runtime::{Bridge, BridgeConfig};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Records pass-through calls and answers 204.
struct RecordingFetch {
    calls: Mutex<Vec<String>>,
}

impl RecordingFetch {
    fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl HttpFetch for RecordingFetch {
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, FetchError> {
        self.calls.lock().unwrap().push(request.url);
        Ok(HttpResponse {
            status: 204,
            body: String::new(),
        })
    }
}

struct Harness {
    bridge: Bridge,
    workspace: Arc<MemoryWorkspace>,
    inner: Arc<RecordingFetch>,
    _data_dir: TempDir,
}

async fn harness() -> Harness {
    let data_dir = tempfile::tempdir().unwrap();
    let config = BridgeConfig {
        data_dir: data_dir.path().to_path_buf(),
        ..Default::default()
    };
    let workspace = Arc::new(MemoryWorkspace::new());
    let inner = Arc::new(RecordingFetch::new());
    let bridge = Bridge::start(
        config,
        Arc::clone(&workspace) as Arc<dyn bridge_host::WorkspaceCapabilities>,
        Arc::clone(&inner) as Arc<dyn HttpFetch>,
    )
    .await
    .unwrap();
    Harness {
        bridge,
        workspace,
        inner,
        _data_dir: data_dir,
    }
}

async fn get(harness: &Harness, path: &str) -> HttpResponse {
    let url = format!("{}{path}", harness.bridge.config().reserved_origin());
    harness
        .bridge
        .fetch()
        .fetch(HttpRequest::new(Method::Get, url))
        .await
        .unwrap()
}

async fn post(harness: &Harness, path: &str, body: Value) -> HttpResponse {
    let url = format!("{}{path}", harness.bridge.config().reserved_origin());
    harness
        .bridge
        .fetch()
        .fetch(HttpRequest::new(Method::Post, url).with_body(body.to_string()))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_health_round_trip() {
    let h = harness().await;

    let resp = get(&h, "/health").await;
    assert_eq!(resp.status, 200);

    let body = resp.json().unwrap();
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["status"], json!("running"));
    assert_eq!(body["data"]["version"], json!("1.0.0"));
    assert_eq!(body["data"]["workspace"], json!("local-workspace"));
    assert!(body["data"]["timestamp"].is_string());
}

#[tokio::test]
async fn test_health_identity_failure_is_an_error_envelope() {
    let h = harness().await;
    h.workspace.deny_identity();

    let resp = get(&h, "/health").await;
    assert_eq!(resp.status, 500);
    let body = resp.json().unwrap();
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("Workspace lookup failed"));
}

#[tokio::test]
async fn test_write_reports_code_unit_count_and_read_returns_content() {
    let h = harness().await;

    let resp = post(&h, "/api/fs/write", json!({"path": "/a.txt", "content": "hi"})).await;
    assert_eq!(resp.status, 200);
    let body = resp.json().unwrap();
    assert_eq!(body["data"]["size"], json!(2));

    let resp = post(&h, "/api/fs/read", json!({"path": "/a.txt"})).await;
    let body = resp.json().unwrap();
    assert_eq!(body["data"]["content"], json!("hi"));
    assert_eq!(body["data"]["path"], json!("/a.txt"));
}

#[tokio::test]
async fn test_read_missing_file_is_500_with_message() {
    let h = harness().await;

    let resp = post(&h, "/api/fs/read", json!({"path": "/missing.txt"})).await;
    assert_eq!(resp.status, 500);
    let body = resp.json().unwrap();
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("File not found: /missing.txt"));
}

#[tokio::test]
async fn test_delete_falls_back_to_directory_removal() {
    let h = harness().await;
    h.workspace.seed_dir("/build");
    h.workspace.seed_file("/build/out.bin", "x");

    let resp = post(&h, "/api/fs/delete", json!({"path": "/build"})).await;
    assert_eq!(resp.status, 200);

    let resp = post(&h, "/api/fs/list", json!({"path": "/build"})).await;
    assert_eq!(resp.status, 500);
}

#[tokio::test]
async fn test_list_normalizes_trailing_slash_in_child_paths() {
    let h = harness().await;
    h.workspace.seed_file("/src/lib.rs", "pub fn f() {}");

    let resp = post(&h, "/api/fs/list", json!({"path": "/src/"})).await;
    assert_eq!(resp.status, 200);
    let body = resp.json().unwrap();
    let files = body["data"]["files"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["name"], json!("lib.rs"));
    assert_eq!(files[0]["path"], json!("/src/lib.rs"));
    assert_eq!(files[0]["type"], json!("file"));
}

#[tokio::test]
async fn test_move_then_copy() {
    let h = harness().await;
    h.workspace.seed_file("/a.txt", "content");

    let resp = post(&h, "/api/fs/move", json!({"from": "/a.txt", "to": "/b.txt"})).await;
    assert_eq!(resp.status, 200);

    let resp = post(&h, "/api/fs/copy", json!({"from": "/b.txt", "to": "/c.txt"})).await;
    assert_eq!(resp.status, 200);

    let resp = post(&h, "/api/fs/read", json!({"path": "/c.txt"})).await;
    assert_eq!(resp.json().unwrap()["data"]["content"], json!("content"));
}

#[tokio::test]
async fn test_unknown_route_is_500_route_not_found() {
    let h = harness().await;

    let resp = post(&h, "/api/nope", json!({})).await;
    assert_eq!(resp.status, 500);
    let body = resp.json().unwrap();
    assert_eq!(body["error"], json!("Route not found: POST /api/nope"));
}

#[tokio::test]
async fn test_exec_command_reports_exit_code_and_output() {
    let h = harness().await;
    h.workspace.register_command("cargo test", 0, "ok\n");

    let resp = post(&h, "/api/exec/command", json!({"command": "cargo test"})).await;
    assert_eq!(resp.status, 200);
    let body = resp.json().unwrap();
    assert_eq!(body["data"]["command"], json!("cargo test"));
    assert_eq!(body["data"]["exitCode"], json!(0));
    assert_eq!(body["data"]["output"], json!("ok\n"));
}

#[tokio::test]
async fn test_workspace_info_aggregates_identity() {
    let h = harness().await;

    let resp = get(&h, "/api/workspace/info").await;
    assert_eq!(resp.status, 200);
    let body = resp.json().unwrap();
    assert_eq!(body["data"]["user"]["username"], json!("dev"));
    assert_eq!(body["data"]["workspace"]["title"], json!("local-workspace"));
    assert_eq!(body["data"]["workspace"]["language"], json!("rust"));
    assert_eq!(body["data"]["bridge"]["status"], json!("connected"));
}

#[tokio::test]
async fn test_workspace_info_propagates_identity_failure() {
    let h = harness().await;
    h.workspace.deny_identity();

    let resp = get(&h, "/api/workspace/info").await;
    assert_eq!(resp.status, 500);
    let body = resp.json().unwrap();
    assert_eq!(body["error"], json!("User lookup failed"));
}

#[tokio::test]
async fn test_other_origin_bypasses_the_bridge() {
    let h = harness().await;

    let resp = h
        .bridge
        .fetch()
        .fetch(HttpRequest::new(Method::Get, "https://example.com/data"))
        .await
        .unwrap();
    assert_eq!(resp.status, 204);
    assert_eq!(
        *h.inner.calls.lock().unwrap(),
        vec!["https://example.com/data".to_string()]
    );
}

#[tokio::test]
async fn test_discovery_descriptor_written_on_start() {
    let h = harness().await;

    let metadata = bridge_runtime::discovery::read_descriptor(
        h.bridge.metadata_path().parent().unwrap(),
    )
    .unwrap();
    assert_eq!(metadata.port, 3002);
    assert_eq!(metadata.workspace_label, "local-workspace");
    assert_eq!(metadata.status, "active");
}

#[tokio::test]
async fn test_fetch_after_shutdown_times_out() {
    let data_dir = tempfile::tempdir().unwrap();
    let config = BridgeConfig {
        data_dir: data_dir.path().to_path_buf(),
        fetch_timeout: Duration::from_millis(50),
        ..Default::default()
    };
    let bridge = Bridge::start(
        config,
        Arc::new(MemoryWorkspace::new()),
        Arc::new(RecordingFetch::new()),
    )
    .await
    .unwrap();

    bridge.shutdown();
    // Give the listener a chance to observe the signal and drop its
    // subscription before the request goes out.
    tokio::time::sleep(Duration::from_millis(20)).await;

    let err = bridge
        .fetch()
        .fetch(HttpRequest::new(
            Method::Get,
            format!("{}/health", bridge.config().reserved_origin()),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Timeout(_)));
}
