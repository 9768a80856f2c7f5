//! nexus-peer configuration
//!
//! Bootstrap settings read once at startup from a TOML file. Every section has
//! built-in defaults, so an empty or missing file yields a runnable peer.

use crate::error::{Error, Result};
use crate::playback::CapacityLimits;
use nexus_common::config::{load_toml_or_default, LoggingConfig};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Default HTTP port for the peer's transport adapter
pub const DEFAULT_PORT: u16 = 5760;

const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Peer configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PeerConfig {
    /// HTTP port for the transport adapter
    pub port: u16,
    /// The only sender allowed to issue audio commands (none when absent)
    pub authority_id: Option<u64>,
    pub limits: CapacityLimits,
    pub scheduler: SchedulerConfig,
    pub fetch: FetchConfig,
    pub logging: LoggingConfig,
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            authority_id: None,
            limits: CapacityLimits::default(),
            scheduler: SchedulerConfig::default(),
            fetch: FetchConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Tick loop settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Session ticks per second
    pub tick_rate_hz: u32,
    /// Refresh interval given to newly materialized stream resources
    pub default_refresh_interval_secs: f32,
    /// Commands buffered between ticks before new ones are dropped
    pub command_buffer: usize,
    /// Broadcast capacity of the event bus
    pub event_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 30,
            default_refresh_interval_secs: 60.0,
            command_buffer: 1024,
            event_capacity: 256,
        }
    }
}

/// Source download and decode settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Whole-request timeout for one download
    pub timeout_secs: u64,
    /// One-shot sources larger than this fail
    pub max_source_bytes: u64,
    /// Streams stop buffering at this size and decode what they have
    pub stream_buffer_bytes: u64,
    /// Packets decoded per tick once the download completes
    pub decode_packets_per_tick: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_source_bytes: 64 * 1024 * 1024,
            stream_buffer_bytes: 2 * 1024 * 1024,
            decode_packets_per_tick: 16,
        }
    }
}

impl PeerConfig {
    /// Load from `path` (defaults when missing) and validate
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config: PeerConfig = load_toml_or_default(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from a TOML string and validate
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PeerConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse peer config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.limits.max_concurrent_audio == 0 {
            return Err(Error::Config("limits.max_concurrent_audio must be at least 1".into()));
        }
        if self.limits.max_concurrent_streams == 0 {
            return Err(Error::Config("limits.max_concurrent_streams must be at least 1".into()));
        }
        if self.scheduler.tick_rate_hz == 0 {
            return Err(Error::Config("scheduler.tick_rate_hz must be at least 1".into()));
        }
        let refresh = self.scheduler.default_refresh_interval_secs;
        if refresh_duration(refresh).is_none() {
            return Err(Error::Config(format!(
                "scheduler.default_refresh_interval_secs must be a positive duration, got {}",
                refresh
            )));
        }
        if self.scheduler.command_buffer == 0 || self.scheduler.event_capacity == 0 {
            return Err(Error::Config("scheduler buffers must be non-empty".into()));
        }
        if self.fetch.decode_packets_per_tick == 0 {
            return Err(Error::Config("fetch.decode_packets_per_tick must be at least 1".into()));
        }
        Ok(())
    }

    /// Wall-clock period between session ticks
    pub fn tick_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.scheduler.tick_rate_hz.max(1)))
    }

    /// Refresh interval for new stream resources (the built-in default when invalid)
    pub fn default_refresh_interval(&self) -> Duration {
        refresh_duration(self.scheduler.default_refresh_interval_secs)
            .unwrap_or(DEFAULT_REFRESH_INTERVAL)
    }
}

/// Seconds as a non-zero `Duration`, if representable
fn refresh_duration(seconds: f32) -> Option<Duration> {
    Duration::try_from_secs_f32(seconds).ok().filter(|d| !d.is_zero())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PeerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.limits.max_concurrent_audio, 5);
        assert_eq!(config.limits.max_concurrent_streams, 1);
        assert_eq!(config.default_refresh_interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = PeerConfig::from_toml_str(
            "authority_id = 42\n\n[limits]\nmax_concurrent_audio = 8\n",
        )
        .unwrap();
        assert_eq!(config.authority_id, Some(42));
        assert_eq!(config.limits.max_concurrent_audio, 8);
        assert_eq!(config.limits.max_concurrent_streams, 1);
        assert_eq!(config.scheduler.tick_rate_hz, 30);
    }

    #[test]
    fn test_zero_limits_rejected() {
        let result = PeerConfig::from_toml_str("[limits]\nmax_concurrent_streams = 0\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_non_positive_refresh_rejected() {
        let result =
            PeerConfig::from_toml_str("[scheduler]\ndefault_refresh_interval_secs = 0.0\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_unrepresentable_refresh_rejected() {
        for value in ["1e30", "nan", "-5.0"] {
            let toml = format!("[scheduler]\ndefault_refresh_interval_secs = {}\n", value);
            let result = PeerConfig::from_toml_str(&toml);
            assert!(matches!(result, Err(Error::Config(_))), "{} was accepted", value);
        }
    }

    #[test]
    fn test_refresh_interval_never_panics_on_unvalidated_config() {
        let mut config = PeerConfig::default();
        config.scheduler.default_refresh_interval_secs = 1e30;
        assert_eq!(config.default_refresh_interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_tick_period() {
        let config = PeerConfig::from_toml_str("[scheduler]\ntick_rate_hz = 50\n").unwrap();
        assert_eq!(config.tick_period(), Duration::from_millis(20));
    }
}
