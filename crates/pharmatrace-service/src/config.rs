//! Configuration aggregate for the provenance service

use chrono::{NaiveDate, Utc};
use pharmatrace_evaluator::EvaluatorConfig;
use pharmatrace_history::{AggregatorConfig, FetchConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Everything the provenance service needs, in one place
///
/// Nothing here is process-wide: each service instance owns its copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvenanceConfig {
    /// Overall request budget (seconds)
    /// Default: 60
    pub deadline_secs: u64,

    /// Date the evaluator treats as "today"; the current UTC date if unset
    pub reference_date: Option<NaiveDate>,

    /// Record fetch and retry settings
    pub fetch: FetchConfig,

    /// Fan-out settings
    pub aggregator: AggregatorConfig,

    /// Rule and heuristic settings
    pub evaluator: EvaluatorConfig,
}

impl Default for ProvenanceConfig {
    fn default() -> Self {
        Self {
            deadline_secs: 60,
            reference_date: None,
            fetch: FetchConfig::default(),
            aggregator: AggregatorConfig::default(),
            evaluator: EvaluatorConfig::default(),
        }
    }
}

impl ProvenanceConfig {
    /// Get the request deadline as a Duration
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }

    /// The configured reference date, or today (UTC)
    pub fn reference_date_or_today(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Utc::now().date_naive())
    }

    /// Validate the configuration and every nested section
    pub fn validate(&self) -> Result<(), String> {
        if self.deadline_secs == 0 {
            return Err("deadline_secs must be greater than 0".to_string());
        }
        self.fetch.validate().map_err(|e| format!("fetch: {}", e))?;
        self.aggregator
            .validate()
            .map_err(|e| format!("aggregator: {}", e))?;
        self.evaluator
            .validate()
            .map_err(|e| format!("evaluator: {}", e))?;
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
