//! In-memory workspace capability.
//!
//! Backs the demo binary and the test suite with a scripted workspace: a
//! flat path-keyed tree, a command table, and fixed identity descriptors.

use super::{CapabilityError, DirEntryInfo, ExecOutcome, WorkspaceCapabilities};
use async_trait::async_trait;
use bridge_protocol::payloads::{EntryKind, UserInfo, WorkspaceDescriptor};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

#[derive(Debug, Clone)]
enum Node {
    File(String),
    Dir,
}

/// Scripted in-memory implementation of [`WorkspaceCapabilities`].
pub struct MemoryWorkspace {
    /// Normalized path -> node. Parents are implied by child keys.
    entries: RwLock<HashMap<String, Node>>,
    /// Scripted command outcomes; unknown commands exit 127.
    commands: RwLock<HashMap<String, ExecOutcome>>,
    user: UserInfo,
    workspace: WorkspaceDescriptor,
    /// When set, identity lookups fail (exercises error aggregation).
    deny_identity: AtomicBool,
}

impl MemoryWorkspace {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            commands: RwLock::new(HashMap::new()),
            user: UserInfo {
                username: "dev".to_string(),
                id: "u-1".to_string(),
            },
            workspace: WorkspaceDescriptor {
                id: "w-local".to_string(),
                title: "local-workspace".to_string(),
                description: "In-memory workspace".to_string(),
                slug: "rust".to_string(),
                url: "https://example.dev/w-local".to_string(),
            },
            deny_identity: AtomicBool::new(false),
        }
    }

    /// Place a file, creating it if absent.
    pub fn seed_file(&self, path: &str, content: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(normalize(path), Node::File(content.to_string()));
        }
    }

    /// Place a directory entry.
    pub fn seed_dir(&self, path: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(normalize(path), Node::Dir);
        }
    }

    /// Script the outcome of a command.
    pub fn register_command(&self, command: &str, exit_code: i32, output: &str) {
        if let Ok(mut commands) = self.commands.write() {
            commands.insert(
                command.to_string(),
                ExecOutcome {
                    exit_code,
                    output: output.to_string(),
                },
            );
        }
    }

    /// Make `current_user` and `current_workspace` fail from now on.
    pub fn deny_identity(&self) {
        self.deny_identity.store(true, Ordering::Relaxed);
    }

    fn lock_entries(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, Node>>, CapabilityError> {
        self.entries
            .write()
            .map_err(|_| CapabilityError::new("workspace state poisoned"))
    }
}

impl Default for MemoryWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Collapse repeated slashes and trim a trailing one (root stays `/`).
fn normalize(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut prev_slash = false;
    for ch in path.chars() {
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
    while out.len() > 1 && out.ends_with('/') {
        out.pop();
    }
    out
}

#[async_trait]
impl WorkspaceCapabilities for MemoryWorkspace {
    async fn read_file(&self, path: &str, _encoding: &str) -> Result<String, CapabilityError> {
        let entries = self.lock_entries()?;
        match entries.get(&normalize(path)) {
            Some(Node::File(content)) => Ok(content.clone()),
            Some(Node::Dir) => Err(CapabilityError::new(format!("Not a file: {path}"))),
            None => Err(CapabilityError::new(format!("File not found: {path}"))),
        }
    }

    async fn write_file(&self, path: &str, content: &str) -> Result<(), CapabilityError> {
        let mut entries = self.lock_entries()?;
        let key = normalize(path);
        if matches!(entries.get(&key), Some(Node::Dir)) {
            return Err(CapabilityError::new(format!("Not a file: {path}")));
        }
        entries.insert(key, Node::File(content.to_string()));
        Ok(())
    }

    async fn read_dir(&self, path: &str) -> Result<Vec<DirEntryInfo>, CapabilityError> {
        let entries = self.lock_entries()?;
        let key = normalize(path);
        let prefix = if key == "/" { key.clone() } else { format!("{key}/") };

        let mut children: Vec<DirEntryInfo> = entries
            .iter()
            .filter_map(|(k, node)| {
                let rest = k.strip_prefix(&prefix)?;
                if rest.is_empty() || rest.contains('/') {
                    return None;
                }
                Some(DirEntryInfo {
                    filename: rest.to_string(),
                    kind: match node {
                        Node::File(_) => EntryKind::File,
                        Node::Dir => EntryKind::Directory,
                    },
                })
            })
            .collect();

        if children.is_empty() && !matches!(entries.get(&key), Some(Node::Dir)) {
            return Err(CapabilityError::new(format!("Directory not found: {path}")));
        }

        children.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(children)
    }

    async fn create_dir(&self, path: &str) -> Result<(), CapabilityError> {
        let mut entries = self.lock_entries()?;
        let key = normalize(path);
        if matches!(entries.get(&key), Some(Node::File(_))) {
            return Err(CapabilityError::new(format!("Not a directory: {path}")));
        }
        entries.insert(key, Node::Dir);
        Ok(())
    }

    async fn delete_file(&self, path: &str) -> Result<(), CapabilityError> {
        let mut entries = self.lock_entries()?;
        let key = normalize(path);
        match entries.get(&key) {
            Some(Node::File(_)) => {
                entries.remove(&key);
                Ok(())
            }
            Some(Node::Dir) => Err(CapabilityError::new(format!("Not a file: {path}"))),
            None => Err(CapabilityError::new(format!("File not found: {path}"))),
        }
    }

    async fn delete_dir(&self, path: &str) -> Result<(), CapabilityError> {
        let mut entries = self.lock_entries()?;
        let key = normalize(path);
        if !matches!(entries.get(&key), Some(Node::Dir)) {
            return Err(CapabilityError::new(format!("Directory not found: {path}")));
        }
        let prefix = format!("{key}/");
        entries.retain(|k, _| k != &key && !k.starts_with(&prefix));
        Ok(())
    }

    async fn move_entry(&self, from: &str, to: &str) -> Result<(), CapabilityError> {
        let mut entries = self.lock_entries()?;
        let from_key = normalize(from);
        let to_key = normalize(to);
        let Some(node) = entries.remove(&from_key) else {
            return Err(CapabilityError::new(format!("Not found: {from}")));
        };

        // Carry descendants along when moving a directory.
        if matches!(node, Node::Dir) {
            let prefix = format!("{from_key}/");
            let moved: Vec<(String, Node)> = entries
                .iter()
                .filter(|(k, _)| k.starts_with(&prefix))
                .map(|(k, v)| (format!("{to_key}/{}", &k[prefix.len()..]), v.clone()))
                .collect();
            entries.retain(|k, _| !k.starts_with(&prefix));
            entries.extend(moved);
        }

        entries.insert(to_key, node);
        Ok(())
    }

    async fn copy_file(&self, from: &str, to: &str) -> Result<(), CapabilityError> {
        let mut entries = self.lock_entries()?;
        let content = match entries.get(&normalize(from)) {
            Some(Node::File(content)) => content.clone(),
            Some(Node::Dir) => return Err(CapabilityError::new(format!("Not a file: {from}"))),
            None => return Err(CapabilityError::new(format!("File not found: {from}"))),
        };
        entries.insert(normalize(to), Node::File(content));
        Ok(())
    }

    async fn execute(
        &self,
        command: &str,
        _env: &HashMap<String, String>,
    ) -> Result<ExecOutcome, CapabilityError> {
        let commands = self
            .commands
            .read()
            .map_err(|_| CapabilityError::new("workspace state poisoned"))?;
        Ok(commands.get(command).cloned().unwrap_or(ExecOutcome {
            exit_code: 127,
            output: format!("command not found: {command}"),
        }))
    }

    async fn current_user(&self) -> Result<UserInfo, CapabilityError> {
        if self.deny_identity.load(Ordering::Relaxed) {
            return Err(CapabilityError::new("User lookup failed"));
        }
        Ok(self.user.clone())
    }

    async fn current_workspace(&self) -> Result<WorkspaceDescriptor, CapabilityError> {
        if self.deny_identity.load(Ordering::Relaxed) {
            return Err(CapabilityError::new("Workspace lookup failed"));
        }
        Ok(self.workspace.clone())
    }
}
