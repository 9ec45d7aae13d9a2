//! Discovery metadata published once at startup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status value written while the bridge is serving.
pub const BRIDGE_STATUS_ACTIVE: &str = "active";

/// Small descriptor external tooling reads to find the bridge.
///
/// Written wholesale at startup and overwritten on re-init; never partially
/// updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeMetadata {
    /// Port of the emulated local origin.
    pub port: u16,
    /// When the bridge came up.
    pub timestamp: DateTime<Utc>,
    /// Human-readable workspace name.
    pub workspace_label: String,
    pub status: String,
}

impl BridgeMetadata {
    /// Descriptor for a bridge that just came up.
    pub fn active(port: u16, workspace_label: impl Into<String>) -> Self {
        Self {
            port,
            timestamp: Utc::now(),
            workspace_label: workspace_label.into(),
            status: BRIDGE_STATUS_ACTIVE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_wire_format() {
        let meta = BridgeMetadata::active(3002, "demo");
        let v = serde_json::to_value(&meta).unwrap();
        assert_eq!(v["port"], 3002);
        assert_eq!(v["status"], "active");
        assert!(v.get("workspaceLabel").is_some());
        assert!(v.get("workspace_label").is_none());
    }

    #[test]
    fn test_round_trip() {
        let meta = BridgeMetadata::active(3002, "demo");
        let json = serde_json::to_string(&meta).unwrap();
        let back: BridgeMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back.port, meta.port);
        assert_eq!(back.workspace_label, "demo");
    }
}
