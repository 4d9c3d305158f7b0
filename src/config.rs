//! Configuration Module
//!
//! Handles loading and managing cache and demo server configuration from
//! environment variables.

use std::env;
use std::time::Duration;

/// Default refresh interval used by the demo server.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(5);

// == Cache Config ==
/// Engine configuration.
///
/// `update_interval: None` selects one-shot mode: every registered update
/// function runs exactly once when the cache is started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheConfig {
    /// Period between refresh cycles
    pub update_interval: Option<Duration>,
}

impl CacheConfig {
    /// One-shot configuration, no background refresh.
    pub fn once() -> Self {
        Self {
            update_interval: None,
        }
    }

    /// Interval configuration refreshing every `interval`.
    pub fn every(interval: Duration) -> Self {
        Self {
            update_interval: Some(interval),
        }
    }
}

// == Server Config ==
/// Demo server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache refresh interval, `None` for one-shot loading
    pub update_interval: Option<Duration>,
    /// HTTP server port
    pub server_port: u16,
    /// Capacity of the refresh error channel
    pub error_buffer: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_UPDATE_INTERVAL_MS` - Refresh interval in milliseconds, `none` or
    ///   `once` for one-shot loading (default: 5000). Zero or negative values are
    ///   kept as a zero interval and rejected when the cache is built.
    /// - `SERVER_PORT` - HTTP server port (default: 4242)
    /// - `ERROR_BUFFER` - Refresh error channel capacity (default: 16)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            update_interval: env::var("CACHE_UPDATE_INTERVAL_MS")
                .ok()
                .map_or(defaults.update_interval, |v| parse_interval_ms(&v)),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            error_buffer: env::var("ERROR_BUFFER")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(defaults.error_buffer),
        }
    }

    /// Engine configuration derived from this server configuration.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            update_interval: self.update_interval,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            update_interval: Some(DEFAULT_UPDATE_INTERVAL),
            server_port: 4242,
            error_buffer: 16,
        }
    }
}

fn parse_interval_ms(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("none") || raw.eq_ignore_ascii_case("once") {
        return None;
    }

    match raw.parse::<i64>() {
        Ok(ms) if ms > 0 => Some(Duration::from_millis(ms as u64)),
        Ok(_) => Some(Duration::ZERO),
        Err(_) => Some(DEFAULT_UPDATE_INTERVAL),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.update_interval, Some(Duration::from_secs(5)));
        assert_eq!(config.server_port, 4242);
        assert_eq!(config.error_buffer, 16);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("CACHE_UPDATE_INTERVAL_MS");
        env::remove_var("SERVER_PORT");
        env::remove_var("ERROR_BUFFER");

        let config = Config::from_env();
        assert_eq!(config.update_interval, Some(DEFAULT_UPDATE_INTERVAL));
        assert_eq!(config.server_port, 4242);
        assert_eq!(config.error_buffer, 16);
    }

    #[test]
    fn test_parse_interval_ms() {
        assert_eq!(parse_interval_ms("250"), Some(Duration::from_millis(250)));
        assert_eq!(parse_interval_ms("none"), None);
        assert_eq!(parse_interval_ms("ONCE"), None);
        assert_eq!(parse_interval_ms("0"), Some(Duration::ZERO));
        assert_eq!(parse_interval_ms("-10"), Some(Duration::ZERO));
        assert_eq!(parse_interval_ms("soon"), Some(DEFAULT_UPDATE_INTERVAL));
    }

    #[test]
    fn test_cache_config_constructors() {
        assert_eq!(CacheConfig::once().update_interval, None);
        assert_eq!(
            CacheConfig::every(Duration::from_millis(20)).update_interval,
            Some(Duration::from_millis(20))
        );
        assert_eq!(
            Config::default().cache_config(),
            CacheConfig::every(DEFAULT_UPDATE_INTERVAL)
        );
    }
}
