//! Discovery descriptor persistence.
//!
//! External tooling finds a running bridge by reading one JSON file under
//! the data directory. The file is written wholesale at startup; a re-init
//! overwrites it completely.

use bridge_protocol::BridgeMetadata;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File name of the descriptor inside the data directory.
pub const DISCOVERY_FILE: &str = "bridge-port.json";

/// Write the descriptor, creating the data directory if needed.
///
/// Returns the path written.
pub fn write_descriptor(data_dir: &Path, metadata: &BridgeMetadata) -> io::Result<PathBuf> {
    fs::create_dir_all(data_dir)?;
    let path = data_dir.join(DISCOVERY_FILE);
    let json = serde_json::to_string_pretty(metadata)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(&path, json)?;
    Ok(path)
}

/// Read a previously written descriptor.
pub fn read_descriptor(data_dir: &Path) -> io::Result<BridgeMetadata> {
    let json = fs::read_to_string(data_dir.join(DISCOVERY_FILE))?;
    serde_json::from_str(&json).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let metadata = BridgeMetadata::active(3002, "demo");

        let path = write_descriptor(dir.path(), &metadata).unwrap();
        assert!(path.ends_with(DISCOVERY_FILE));

        let back = read_descriptor(dir.path()).unwrap();
        assert_eq!(back.port, 3002);
        assert_eq!(back.workspace_label, "demo");
        assert_eq!(back.status, "active");
    }

    #[test]
    fn test_rewrite_replaces_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        write_descriptor(dir.path(), &BridgeMetadata::active(3002, "first")).unwrap();
        write_descriptor(dir.path(), &BridgeMetadata::active(4000, "second")).unwrap();

        let back = read_descriptor(dir.path()).unwrap();
        assert_eq!(back.port, 4000);
        assert_eq!(back.workspace_label, "second");
    }

    #[test]
    fn test_read_missing_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_descriptor(dir.path()).is_err());
    }
}
