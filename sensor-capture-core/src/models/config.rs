use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::SessionError;

/// Configuration for a capture session.
///
/// Every field has a default, so a JSON file only needs to name the fields
/// it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfiguration {
    /// Broker name of the sensor to open.
    pub sensor_name: String,

    /// Broker name of the shared buffer paired with the sensor.
    pub buffer_name: String,

    /// Size in bytes of the shared buffer and of every capture chunk.
    pub buffer_size: usize,

    /// Delay between status polls and between capture iterations.
    pub poll_interval_ms: u64,

    /// Number of leading bytes rendered in the hex preview of each chunk.
    pub preview_len: usize,

    /// Append-only file receiving captured bytes.
    pub output_path: PathBuf,

    /// Optional JSON-lines file receiving one report per session.
    pub report_path: Option<PathBuf>,

    /// Issue a start trigger as soon as the recorder launches.
    pub start_on_launch: bool,
}

impl SessionConfiguration {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.sensor_name.is_empty() {
            return Err("sensor name must not be empty".into());
        }
        if self.buffer_name.is_empty() {
            return Err("buffer name must not be empty".into());
        }
        if self.buffer_size == 0 {
            return Err("buffer size must be positive".into());
        }
        if self.preview_len > self.buffer_size {
            return Err(format!(
                "preview length {} exceeds buffer size {}",
                self.preview_len, self.buffer_size
            ));
        }
        Ok(())
    }

    /// Load and validate a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, SessionError> {
        let json = fs::read_to_string(path).map_err(|e| {
            SessionError::Configuration(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|e| {
            SessionError::Configuration(format!("failed to parse {}: {}", path.display(), e))
        })?;
        config.validate().map_err(SessionError::Configuration)?;
        Ok(config)
    }
}

impl Default for SessionConfiguration {
    fn default() -> Self {
        Self {
            sensor_name: "com.apple.sensors.mic".into(),
            buffer_name: "com.apple.audio.mic".into(),
            buffer_size: 0x10000,
            poll_interval_ms: 1000,
            preview_len: 16,
            output_path: PathBuf::from("/var/mobile/Library/VoiceTrigger/foo"),
            report_path: None,
            start_on_launch: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = SessionConfiguration::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.buffer_size, 65536);
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
    }

    #[test]
    fn rejects_zero_buffer() {
        let config = SessionConfiguration {
            buffer_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_preview_longer_than_buffer() {
        let config = SessionConfiguration {
            buffer_size: 8,
            preview_len: 16,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().contains("exceeds"));
    }

    #[test]
    fn loads_partial_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recorder.json");
        fs::write(&path, r#"{ "buffer_size": 4096, "poll_interval_ms": 250 }"#).unwrap();

        let config = SessionConfiguration::from_json_file(&path).unwrap();
        assert_eq!(config.buffer_size, 4096);
        assert_eq!(config.poll_interval(), Duration::from_millis(250));
        assert_eq!(config.sensor_name, "com.apple.sensors.mic");
    }

    #[test]
    fn invalid_json_file_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recorder.json");
        fs::write(&path, r#"{ "buffer_size": 0 }"#).unwrap();

        let err = SessionConfiguration::from_json_file(&path).unwrap_err();
        assert!(matches!(err, SessionError::Configuration(_)));
    }
}
