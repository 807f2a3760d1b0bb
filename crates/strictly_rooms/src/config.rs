//! Server configuration.

use crate::error::ConfigError;
use crate::hub::{DEFAULT_GRACE_PERIOD, HubSettings};
use crate::registry::{DEFAULT_ROOM_TTL, DEFAULT_SWEEP_INTERVAL};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Configuration for the room server.
///
/// Every field is optional in the TOML file; missing ones take defaults.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to.
    host: String,

    /// Port to bind to.
    port: u16,

    /// Seconds a vacated slot stays reserved for reconnection.
    grace_period_secs: u64,

    /// Seconds of inactivity after which a room is evicted.
    room_ttl_secs: u64,

    /// Seconds between inactivity sweeps.
    sweep_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            grace_period_secs: DEFAULT_GRACE_PERIOD.as_secs(),
            room_ttl_secs: DEFAULT_ROOM_TTL.as_secs(),
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL.as_secs(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;

        info!(host = %config.host, port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Applies command-line overrides.
    #[instrument(skip(self))]
    pub fn with_overrides(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    /// Rejects zero durations, which would close rooms instantly or spin the sweep.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grace_period_secs == 0 {
            return Err(ConfigError::new("grace_period_secs must be at least 1"));
        }
        if self.room_ttl_secs == 0 {
            return Err(ConfigError::new("room_ttl_secs must be at least 1"));
        }
        if self.sweep_interval_secs == 0 {
            return Err(ConfigError::new("sweep_interval_secs must be at least 1"));
        }
        Ok(())
    }

    /// Timing settings for the hub.
    pub fn hub_settings(&self) -> HubSettings {
        HubSettings::new(
            Duration::from_secs(self.grace_period_secs),
            Duration::from_secs(self.room_ttl_secs),
        )
    }

    /// Period of the inactivity sweep.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_room_lifecycle() {
        let config = ServerConfig::default();
        assert_eq!(*config.grace_period_secs(), 60);
        assert_eq!(*config.room_ttl_secs(), 600);
        assert_eq!(config.sweep_interval(), Duration::from_secs(60));
        assert_eq!(config.hub_settings(), HubSettings::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 8080\ngrace_period_secs = 30").unwrap();

        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(*config.port(), 8080);
        assert_eq!(*config.grace_period_secs(), 30);
        assert_eq!(config.host(), "127.0.0.1");
        assert_eq!(*config.room_ttl_secs(), 600);
    }

    #[test]
    fn test_zero_duration_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "sweep_interval_secs = 0").unwrap();

        let err = ServerConfig::from_file(file.path()).unwrap_err();
        assert!(err.message.contains("sweep_interval_secs"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = ServerConfig::from_file("/nonexistent/strictly_rooms.toml").unwrap_err();
        assert!(err.message.contains("Failed to read"));
    }

    #[test]
    fn test_overrides_win() {
        let config = ServerConfig::default().with_overrides(Some("0.0.0.0".to_string()), None);
        assert_eq!(config.host(), "0.0.0.0");
        assert_eq!(*config.port(), 3000);
    }
}
