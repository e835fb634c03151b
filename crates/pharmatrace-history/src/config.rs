//! Configuration for record fetching and aggregation

use serde::{Deserialize, Serialize};
use std::time::Duration;

use pharmatrace_domain::record::MIN_CONTENT_ADDRESS_LEN;

/// Retry and validation policy for the [`RecordFetcher`](crate::RecordFetcher)
///
/// # Examples
///
/// ```
/// use pharmatrace_history::FetchConfig;
/// use std::time::Duration;
///
/// let config = FetchConfig::default();
/// assert_eq!(config.max_attempts, 3);
/// assert_eq!(config.backoff_for(1), Duration::from_millis(200));
/// assert_eq!(config.backoff_for(2), Duration::from_millis(400));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Total attempts per record, including the first
    /// Default: 3
    pub max_attempts: u32,

    /// Delay before the first retry (milliseconds)
    /// Default: 200
    pub initial_backoff_ms: u64,

    /// Growth factor applied to the delay after each retry
    /// Default: 2.0 (1.0 gives a fixed interval)
    pub backoff_multiplier: f64,

    /// Upper bound on any single retry delay (milliseconds)
    /// Default: 2000
    pub max_backoff_ms: u64,

    /// Time allowed for a single fetch attempt (milliseconds)
    /// Default: 10000
    pub attempt_timeout_ms: u64,

    /// Minimum content-address length accepted before fetching
    /// Default: 46 (CIDv0)
    pub min_ref_len: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 200,
            backoff_multiplier: 2.0,
            max_backoff_ms: 2_000,
            attempt_timeout_ms: 10_000,
            min_ref_len: MIN_CONTENT_ADDRESS_LEN,
        }
    }
}

impl FetchConfig {
    /// Aggressive preset: fail fast on slow gateways
    pub fn aggressive() -> Self {
        Self {
            max_attempts: 2,
            initial_backoff_ms: 100,
            backoff_multiplier: 1.0,
            max_backoff_ms: 100,
            attempt_timeout_ms: 3_000,
            min_ref_len: MIN_CONTENT_ADDRESS_LEN,
        }
    }

    /// Lenient preset: more attempts and longer waits for flaky pinning
    pub fn lenient() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff_ms: 500,
            backoff_multiplier: 2.0,
            max_backoff_ms: 8_000,
            attempt_timeout_ms: 30_000,
            min_ref_len: MIN_CONTENT_ADDRESS_LEN,
        }
    }

    /// Delay to wait after the given failed attempt (1-based)
    pub fn backoff_for(&self, failed_attempt: u32) -> Duration {
        let exponent = failed_attempt.saturating_sub(1) as i32;
        let delay_ms = self.initial_backoff_ms as f64 * self.backoff_multiplier.powi(exponent);
        let capped = delay_ms.min(self.max_backoff_ms as f64);
        Duration::from_millis(capped as u64)
    }

    /// Per-attempt timeout as a Duration
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1".to_string());
        }
        if self.backoff_multiplier.is_nan() || self.backoff_multiplier < 1.0 {
            return Err("backoff_multiplier must be >= 1.0".to_string());
        }
        if self.max_backoff_ms < self.initial_backoff_ms {
            return Err("max_backoff_ms cannot be less than initial_backoff_ms".to_string());
        }
        if self.attempt_timeout_ms == 0 {
            return Err("attempt_timeout_ms must be greater than 0".to_string());
        }
        if self.min_ref_len == 0 {
            return Err("min_ref_len must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

/// Fan-out policy for the [`HistoryAggregator`](crate::HistoryAggregator)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Maximum fetches in flight at once
    /// Default: 8
    pub max_in_flight: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self { max_in_flight: 8 }
    }
}

impl AggregatorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_in_flight == 0 {
            return Err("max_in_flight must be greater than 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(FetchConfig::default().validate().is_ok());
        assert!(AggregatorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(FetchConfig::aggressive().validate().is_ok());
        assert!(FetchConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_backoff_is_exponential_and_capped() {
        let config = FetchConfig::default();
        assert_eq!(config.backoff_for(1), Duration::from_millis(200));
        assert_eq!(config.backoff_for(3), Duration::from_millis(800));
        assert_eq!(config.backoff_for(10), Duration::from_millis(2_000));
    }

    #[test]
    fn test_fixed_backoff() {
        let config = FetchConfig::aggressive();
        assert_eq!(config.backoff_for(1), config.backoff_for(5));
    }

    #[test]
    fn test_invalid_values() {
        let mut config = FetchConfig::default();
        config.max_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = FetchConfig::default();
        config.backoff_multiplier = 0.5;
        assert!(config.validate().is_err());

        let mut config = FetchConfig::default();
        config.backoff_multiplier = f64::NAN;
        assert!(config.validate().is_err());

        assert!(AggregatorConfig { max_in_flight: 0 }.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = FetchConfig::from_toml("max_attempts = 5").unwrap();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.initial_backoff_ms, 200);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = FetchConfig::lenient();
        let parsed = FetchConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(config, parsed);
    }
}
