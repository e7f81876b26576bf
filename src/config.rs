//! Configuration for cuetrack sessions.

use crate::defaults;
use crate::error::{CuetrackError, Result};
use crate::session::controller::SessionTiming;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub tracking: TrackingConfig,
    pub timing: TimingConfig,
    pub recognition: RecognitionConfig,
}

/// Word-matching configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrackingConfig {
    /// Similarity threshold for regular word matching.
    pub similarity_threshold: f64,
    /// Relaxed threshold for the final script word.
    pub last_word_threshold: f64,
}

/// Session timer configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    /// Idle watchdog before a forced restart.
    pub watchdog_ms: u64,
    /// Pause between the stop and start of a forced restart.
    pub restart_pause_ms: u64,
    /// Delay between completion and the finished notification.
    pub settle_delay_ms: u64,
}

/// Recognition engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecognitionConfig {
    /// BCP-47 locale tag.
    pub locale: String,
    /// Emit interim results.
    pub interim_results: bool,
    /// Keep listening across utterance boundaries.
    pub continuous: bool,
    /// Maximum transcript alternatives per result.
    pub max_alternatives: u32,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: defaults::SIMILARITY_THRESHOLD,
            last_word_threshold: defaults::LAST_WORD_THRESHOLD,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            watchdog_ms: defaults::WATCHDOG.as_millis() as u64,
            restart_pause_ms: defaults::RESTART_PAUSE.as_millis() as u64,
            settle_delay_ms: defaults::SETTLE_DELAY.as_millis() as u64,
        }
    }
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            locale: defaults::LOCALE.to_string(),
            interim_results: true,
            continuous: true,
            max_alternatives: defaults::MAX_ALTERNATIVES,
        }
    }
}

impl TimingConfig {
    /// Converts the millisecond fields into controller timer durations.
    pub fn to_session_timing(&self) -> SessionTiming {
        SessionTiming {
            watchdog: Duration::from_millis(self.watchdog_ms),
            restart_pause: Duration::from_millis(self.restart_pause_ms),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is absent.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => {
                let config: Config = toml::from_str(&contents)?;
                config.validate()?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| CuetrackError::Other(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            (
                "tracking.similarity_threshold",
                self.tracking.similarity_threshold,
            ),
            (
                "tracking.last_word_threshold",
                self.tracking.last_word_threshold,
            ),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(CuetrackError::ConfigInvalidValue {
                    key: key.to_string(),
                    message: format!("must be within [0, 1], got {}", value),
                });
            }
        }
        if self.tracking.last_word_threshold > self.tracking.similarity_threshold {
            return Err(CuetrackError::ConfigInvalidValue {
                key: "tracking.last_word_threshold".to_string(),
                message: "must not exceed tracking.similarity_threshold".to_string(),
            });
        }
        if self.timing.watchdog_ms == 0 {
            return Err(CuetrackError::ConfigInvalidValue {
                key: "timing.watchdog_ms".to_string(),
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}
