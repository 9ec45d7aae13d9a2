//! Bridge configuration with validation.

use bridge_bus::DEFAULT_CHANNEL_CAPACITY;
use bridge_protocol::LOCAL_API_PORT;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors, all fatal at startup.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("port cannot be 0")]
    InvalidPort,
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    #[error("invalid capacity: {0}")]
    InvalidCapacity(String),
}

/// Runtime configuration for one bridge instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Port of the emulated local origin.
    pub port: u16,
    /// Default bound for a transport-level wait.
    pub request_timeout: Duration,
    /// Bound applied to every intercepted fetch.
    pub fetch_timeout: Duration,
    /// Bus buffer per subscriber.
    pub channel_capacity: usize,
    /// How often the expired-entry sweep runs.
    pub cleanup_interval: Duration,
    /// How often the liveness tick fires.
    pub heartbeat_interval: Duration,
    /// Where the discovery descriptor is written.
    pub data_dir: PathBuf,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            port: LOCAL_API_PORT,
            request_timeout: Duration::from_millis(10_000),
            fetch_timeout: Duration::from_millis(10_000),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            cleanup_interval: Duration::from_secs(30),
            heartbeat_interval: Duration::from_secs(30),
            data_dir: PathBuf::from("./data"),
        }
    }
}

impl BridgeConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "request_timeout cannot be 0".into(),
            ));
        }
        if self.fetch_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "fetch_timeout cannot be 0".into(),
            ));
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::InvalidCapacity(
                "channel_capacity cannot be 0".into(),
            ));
        }
        Ok(())
    }

    /// The URL prefix the interceptor claims.
    #[must_use]
    pub fn reserved_origin(&self) -> String {
        format!("http://localhost:{}", self.port)
    }
}
