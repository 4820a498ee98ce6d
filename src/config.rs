//! Relay configuration
//!
//! Loaded from a JSON file (camelCase keys). Every field has a default, so a
//! partial file or no file at all is fine.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::capture::encoder::DEFAULT_JPEG_QUALITY;
use crate::capture::Resolution;
use crate::error::{RelayError, RelayResult};
use crate::gesture::ClassifierThresholds;
use crate::interaction::InteractionConfig;
use crate::processing::DEFAULT_HISTORY_LENGTH;

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "HANDLINK_CONFIG";

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5052";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RelayConfig {
    /// Address the single-client listener binds to
    pub bind_address: String,

    /// Initial outbound frame size; the client may change it with `resize`
    pub output: Resolution,

    /// Screen the wrist position is mapped onto
    pub screen: Resolution,

    /// Frames averaged by the cursor smoother
    pub cursor_history: usize,

    pub interaction: InteractionConfig,

    pub classifier: ClassifierThresholds,

    /// JPEG quality (1-100) for resized frames
    pub jpeg_quality: u8,

    /// Program and arguments of the external hand tracker
    pub tracker_command: Vec<String>,

    /// Where to write the injected-action journal when the session ends
    pub journal_path: Option<PathBuf>,

    /// Client-side connection attempts
    pub connect_retries: u32,

    /// Delay between client connection attempts (ms)
    pub connect_retry_interval_ms: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            output: Resolution::new(640, 480),
            screen: Resolution::new(1920, 1080),
            cursor_history: DEFAULT_HISTORY_LENGTH,
            interaction: InteractionConfig::default(),
            classifier: ClassifierThresholds::default(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            tracker_command: Vec::new(),
            journal_path: None,
            connect_retries: 10,
            connect_retry_interval_ms: 500,
        }
    }
}

impl RelayConfig {
    pub fn from_file(path: &Path) -> RelayResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RelayError::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            RelayError::Configuration(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the file named by `HANDLINK_CONFIG`, or use defaults
    pub fn from_env() -> RelayResult<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn connect_retry_interval(&self) -> Duration {
        Duration::from_millis(self.connect_retry_interval_ms)
    }

    pub fn validate(&self) -> RelayResult<()> {
        if self.output.is_empty() {
            return Err(RelayError::Configuration(format!(
                "Output size must be non-zero, got {}",
                self.output
            )));
        }
        if self.screen.is_empty() {
            return Err(RelayError::Configuration(format!(
                "Screen size must be non-zero, got {}",
                self.screen
            )));
        }
        if self.cursor_history == 0 {
            return Err(RelayError::Configuration(
                "Cursor history must hold at least one sample".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RelayConfig::default();
        assert_eq!(config.bind_address, "127.0.0.1:5052");
        assert_eq!(config.output, Resolution::new(640, 480));
        assert_eq!(config.cursor_history, 5);
        assert_eq!(config.interaction.grab_debounce_ms, 200);
        assert_eq!(config.interaction.click_cooldown_ms, 500);
        assert_eq!(config.classifier.left_index_max, 100.0);
        assert_eq!(config.jpeg_quality, 40);
        assert_eq!(config.connect_retries, 10);
        assert_eq!(config.connect_retry_interval(), Duration::from_millis(500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("handlink.json");
        std::fs::write(
            &path,
            r#"{
                "bindAddress": "0.0.0.0:6000",
                "output": { "width": 320, "height": 240 },
                "interaction": { "clickCooldownMs": 750 },
                "classifier": { "leftIndexMax": 75.0 },
                "trackerCommand": ["python", "tracker.py"]
            }"#,
        )
        .unwrap();

        let config = RelayConfig::from_file(&path).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:6000");
        assert_eq!(config.output, Resolution::new(320, 240));
        assert_eq!(config.interaction.click_cooldown_ms, 750);
        assert_eq!(config.interaction.grab_debounce_ms, 200);
        assert_eq!(config.classifier.left_index_max, 75.0);
        assert_eq!(config.classifier.bent_angle, 70.0);
        assert_eq!(config.tracker_command, vec!["python", "tracker.py"]);
        assert_eq!(config.screen, Resolution::new(1920, 1080));
    }

    #[test]
    fn test_invalid_values() {
        let config = RelayConfig {
            output: Resolution::new(0, 480),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(RelayError::Configuration(_))));

        let config = RelayConfig {
            cursor_history: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            RelayConfig::from_file(&missing),
            Err(RelayError::Configuration(_))
        ));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{ not json").unwrap();
        assert!(RelayConfig::from_file(&bad).is_err());
    }
}
