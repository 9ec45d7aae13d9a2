//! Host capability interface the dispatcher delegates to.
//!
//! The bridge core never implements file or process semantics itself; it
//! calls whatever implementation of [`WorkspaceCapabilities`] it was handed.
//! Capability failures carry a message only; the dispatcher surfaces it
//! verbatim in the error envelope and never retries.

pub mod memory;

use async_trait::async_trait;
use bridge_protocol::payloads::{EntryKind, UserInfo, WorkspaceDescriptor};
use std::collections::HashMap;
use thiserror::Error;

/// Failure reported by a capability.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct CapabilityError {
    message: String,
}

impl CapabilityError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for CapabilityError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for CapabilityError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// One child of a directory, as the capability reports it.
#[derive(Debug, Clone)]
pub struct DirEntryInfo {
    pub filename: String,
    pub kind: EntryKind,
}

/// Result of running a command.
#[derive(Debug, Clone)]
pub struct ExecOutcome {
    pub exit_code: i32,
    pub output: String,
}

/// Operations the host environment provides.
///
/// Implementations are assumed fail-clean: a reported error means the
/// operation had no lasting effect.
#[async_trait]
pub trait WorkspaceCapabilities: Send + Sync {
    async fn read_file(&self, path: &str, encoding: &str) -> Result<String, CapabilityError>;

    async fn write_file(&self, path: &str, content: &str) -> Result<(), CapabilityError>;

    async fn read_dir(&self, path: &str) -> Result<Vec<DirEntryInfo>, CapabilityError>;

    async fn create_dir(&self, path: &str) -> Result<(), CapabilityError>;

    async fn delete_file(&self, path: &str) -> Result<(), CapabilityError>;

    async fn delete_dir(&self, path: &str) -> Result<(), CapabilityError>;

    async fn move_entry(&self, from: &str, to: &str) -> Result<(), CapabilityError>;

    async fn copy_file(&self, from: &str, to: &str) -> Result<(), CapabilityError>;

    /// Run a command with extra environment variables. No timeout is imposed
    /// here; a long-running command blocks its handler until it finishes.
    async fn execute(
        &self,
        command: &str,
        env: &HashMap<String, String>,
    ) -> Result<ExecOutcome, CapabilityError>;

    async fn current_user(&self) -> Result<UserInfo, CapabilityError>;

    async fn current_workspace(&self) -> Result<WorkspaceDescriptor, CapabilityError>;
}
