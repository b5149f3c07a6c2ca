//! Sentinel configuration
//!
//! Layered: built-in defaults, then an optional TOML file, then
//! `SENTINEL_*` environment variables (`SENTINEL_ALERT_THRESHOLD`,
//! `SENTINEL_DETECTION__TILT_THRESHOLD`, ...).

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use ::config::{Config, Environment, File};
use alerting::{AlertPolicy, PlayerCommand, SoundConfig};
use detection::DetectionConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::SentinelError;

/// File read when no explicit path is given
pub const DEFAULT_CONFIG_FILE: &str = "sentinel.toml";

/// Sentinel configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentinelConfig {
    /// Seconds of continuous bad behavior before alerting
    pub alert_threshold: f64,

    /// Seconds between alerts
    pub alert_cooldown: f64,

    /// Inactive ticks tolerated before a run resets (0 = reset immediately)
    pub grace_ticks: u32,

    /// Directory of alert sounds
    pub sounds_dir: PathBuf,

    /// Audio player override
    pub player: Option<PlayerCommand>,

    /// Log alerts instead of playing sounds
    pub silent: bool,

    /// Prometheus exporter address
    pub metrics_addr: Option<SocketAddr>,

    /// Detector sensitivity
    pub detection: DetectionConfig,
}

impl Default for SentinelConfig {
    fn default() -> Self {
        let policy = AlertPolicy::default();
        Self {
            alert_threshold: policy.threshold_secs,
            alert_cooldown: policy.cooldown_secs,
            grace_ticks: 0,
            sounds_dir: PathBuf::from("sounds"),
            player: None,
            silent: false,
            metrics_addr: None,
            detection: DetectionConfig::default(),
        }
    }
}

impl SentinelConfig {
    /// Load configuration from `path` (or `sentinel.toml` if present) and
    /// the environment
    pub fn load(path: Option<&Path>) -> Result<Self, SentinelError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config: Self = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("SENTINEL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        info!(
            "Loaded config: threshold {}s, cooldown {}s, grace {} ticks",
            config.alert_threshold, config.alert_cooldown, config.grace_ticks
        );
        Ok(config)
    }

    /// Reject values the tick loop cannot work with
    pub fn validate(&self) -> Result<(), SentinelError> {
        for (name, value) in [
            ("alert_threshold", self.alert_threshold),
            ("alert_cooldown", self.alert_cooldown),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SentinelError::Invalid(format!("{} must be a non-negative number, got {}", name, value)));
            }
        }
        self.detection.validate()?;
        Ok(())
    }

    pub fn policy(&self) -> AlertPolicy {
        AlertPolicy {
            threshold_secs: self.alert_threshold,
            cooldown_secs: self.alert_cooldown,
        }
    }

    pub fn sound_config(&self) -> SoundConfig {
        SoundConfig {
            sounds_dir: self.sounds_dir.clone(),
            player: self.player.clone().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SentinelConfig::default();
        assert_eq!(config.alert_threshold, 60.0);
        assert_eq!(config.alert_cooldown, 30.0);
        assert_eq!(config.grace_ticks, 0);
        assert_eq!(config.sounds_dir, PathBuf::from("sounds"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sentinel.toml");
        std::fs::write(
            &path,
            r#"
alert_threshold = 45.0
grace_ticks = 3
silent = true

[player]
program = "paplay"

[detection]
tilt_threshold = 0.08
"#,
        )
        .unwrap();

        let config = SentinelConfig::load(Some(&path)).unwrap();
        assert_eq!(config.alert_threshold, 45.0);
        assert_eq!(config.alert_cooldown, 30.0);
        assert_eq!(config.grace_ticks, 3);
        assert!(config.silent);
        assert_eq!(config.detection.tilt_threshold, 0.08);
        assert_eq!(config.detection.slouch_threshold, 0.1);
        assert_eq!(config.sound_config().player.program, "paplay");
        assert!(config.sound_config().player.args.is_empty());
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = SentinelConfig::load(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(SentinelError::Config(_))));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sentinel.toml");
        std::fs::write(&path, "alert_cooldown = -1.0\n").unwrap();

        assert!(matches!(SentinelConfig::load(Some(&path)), Err(SentinelError::Invalid(_))));
    }

    #[test]
    fn test_policy() {
        let config = SentinelConfig {
            alert_threshold: 10.0,
            alert_cooldown: 5.0,
            ..Default::default()
        };
        assert_eq!(
            config.policy(),
            AlertPolicy {
                threshold_secs: 10.0,
                cooldown_secs: 5.0,
            }
        );
    }
}
