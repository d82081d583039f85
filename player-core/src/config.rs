//! # Player Configuration
//!
//! Configuration for the playback facade: retry ceiling, watchdog
//! thresholds, and timeout windows.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playback facade configuration.
///
/// Controls the resilience layer (retry ceiling, memory high-water mark,
/// stall timeout) and the facade's timing behavior (settings fallback,
/// position update cadence).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Maximum automatic retries after consecutive stream errors.
    ///
    /// Once the counter reaches this ceiling, errors propagate to consumers
    /// as a terminal `error` event instead of auto-retrying.
    ///
    /// Default: 5.
    #[serde(default = "default_retry_ceiling")]
    pub retry_ceiling: u32,

    /// Resource-usage high-water mark in bytes.
    ///
    /// Crossing it triggers a non-destructive backend reset (new underlying
    /// audio object, same stream position) rather than a full reload.
    ///
    /// Default: 204,857,600 bytes (~195 MiB).
    #[serde(default = "default_memory_high_water_bytes")]
    pub memory_high_water_bytes: u64,

    /// Buffering stall window. `None` disables stall detection; the core
    /// enforces no default, callers opt in via `setStallTimeout`.
    #[serde(default)]
    pub stall_timeout: Option<Duration>,

    /// How long to wait for the settings/consent round-trip before playback
    /// proceeds with the default volume.
    ///
    /// Default: 5 seconds.
    #[serde(default = "default_settings_timeout")]
    pub settings_timeout: Duration,

    /// Cadence of the periodic `update` position event.
    ///
    /// Default: 1 second.
    #[serde(default = "default_update_interval")]
    pub update_interval: Duration,

    /// Volume committed when the settings round-trip times out.
    ///
    /// Default: 100.
    #[serde(default = "default_volume")]
    pub default_volume: u8,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            retry_ceiling: default_retry_ceiling(),
            memory_high_water_bytes: default_memory_high_water_bytes(),
            stall_timeout: None,
            settings_timeout: default_settings_timeout(),
            update_interval: default_update_interval(),
            default_volume: default_volume(),
        }
    }
}

impl PlayerConfig {
    /// Set the retry ceiling.
    pub fn with_retry_ceiling(mut self, ceiling: u32) -> Self {
        self.retry_ceiling = ceiling;
        self
    }

    /// Set the memory high-water mark in bytes.
    pub fn with_memory_high_water(mut self, bytes: u64) -> Self {
        self.memory_high_water_bytes = bytes;
        self
    }

    /// Set the buffering stall window.
    pub fn with_stall_timeout(mut self, timeout: Duration) -> Self {
        self.stall_timeout = Some(timeout);
        self
    }

    /// Set the settings round-trip timeout.
    pub fn with_settings_timeout(mut self, timeout: Duration) -> Self {
        self.settings_timeout = timeout;
        self
    }

    /// Set the `update` event cadence.
    pub fn with_update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval;
        self
    }

    /// Set the fallback volume.
    pub fn with_default_volume(mut self, volume: u8) -> Self {
        self.default_volume = volume;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.memory_high_water_bytes == 0 {
            return Err("memory_high_water_bytes must be > 0".to_string());
        }

        if self.default_volume > 100 {
            return Err("default_volume must be in 0..=100".to_string());
        }

        if self.update_interval.is_zero() {
            return Err("update_interval must be > 0".to_string());
        }

        if let Some(timeout) = self.stall_timeout {
            if timeout.is_zero() {
                return Err("stall_timeout must be > 0 when set".to_string());
            }
        }

        Ok(())
    }
}

// ============================================================================
// Default Functions (for serde)
// ============================================================================

fn default_retry_ceiling() -> u32 {
    5
}

fn default_memory_high_water_bytes() -> u64 {
    204_857_600 // ~195 MiB
}

fn default_settings_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_update_interval() -> Duration {
    Duration::from_secs(1)
}

fn default_volume() -> u8 {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PlayerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.retry_ceiling, 5);
        assert_eq!(config.memory_high_water_bytes, 204_857_600);
        assert_eq!(config.stall_timeout, None);
        assert_eq!(config.settings_timeout, Duration::from_secs(5));
        assert_eq!(config.default_volume, 100);
    }

    #[test]
    fn test_config_validation() {
        let mut config = PlayerConfig::default();
        assert!(config.validate().is_ok());

        config.memory_high_water_bytes = 0;
        assert!(config.validate().is_err());
        config.memory_high_water_bytes = default_memory_high_water_bytes();

        config.default_volume = 150;
        assert!(config.validate().is_err());
        config.default_volume = 100;

        config.stall_timeout = Some(Duration::ZERO);
        assert!(config.validate().is_err());
        config.stall_timeout = Some(Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_helpers() {
        let config = PlayerConfig::default()
            .with_retry_ceiling(3)
            .with_memory_high_water(64 * 1024 * 1024)
            .with_stall_timeout(Duration::from_secs(10))
            .with_default_volume(60);

        assert_eq!(config.retry_ceiling, 3);
        assert_eq!(config.memory_high_water_bytes, 64 * 1024 * 1024);
        assert_eq!(config.stall_timeout, Some(Duration::from_secs(10)));
        assert_eq!(config.default_volume, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_serde_defaults() {
        let config: PlayerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.retry_ceiling, 5);
        assert_eq!(config.stall_timeout, None);
        assert_eq!(config.update_interval, Duration::from_secs(1));
    }
}
