// ABOUTME: Coordinator timing configuration - liveness timeout, marker window,
// ABOUTME: and convergence poll watchdog/interval, with serde defaults.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Timings that govern the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// How long a frame has to answer a liveness ping, in milliseconds.
    #[serde(default = "default_liveness_timeout_ms")]
    pub liveness_timeout_ms: u64,

    /// How long the new-version marker stays on a container, in milliseconds.
    #[serde(default = "default_marker_window_ms")]
    pub marker_window_ms: u64,

    /// Hard stop for a convergence poll, in milliseconds.
    ///
    /// The default is much shorter than `poll_interval_ms`, so a default
    /// poll performs a single reload pass before the watchdog ends it.
    #[serde(default = "default_poll_watchdog_ms")]
    pub poll_watchdog_ms: u64,

    /// Pause between convergence poll iterations, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_liveness_timeout_ms() -> u64 {
    2000
}

fn default_marker_window_ms() -> u64 {
    3000
}

fn default_poll_watchdog_ms() -> u64 {
    600
}

fn default_poll_interval_ms() -> u64 {
    20_000
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            liveness_timeout_ms: default_liveness_timeout_ms(),
            marker_window_ms: default_marker_window_ms(),
            poll_watchdog_ms: default_poll_watchdog_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl CoordinatorConfig {
    /// Parse a JSON document, filling absent fields with defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }

    /// Reject timings that would make the coordinator spin or never detect anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.liveness_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "liveness_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn liveness_timeout(&self) -> Duration {
        Duration::from_millis(self.liveness_timeout_ms)
    }

    pub fn marker_window(&self) -> Duration {
        Duration::from_millis(self.marker_window_ms)
    }

    pub fn poll_watchdog(&self) -> Duration {
        Duration::from_millis(self.poll_watchdog_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
