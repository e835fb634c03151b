//! Configuration for the Evaluator

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Field names that carry each rule's input
///
/// Names are compared after lowercasing and dropping everything that is not
/// a letter or digit, so `batchNo`, `Batch No.` and `batch_no` all match
/// `batchno`. For flattened keys only the last segment is compared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldAliases {
    /// Storage condition fields (rule 1)
    pub storage_condition: Vec<String>,

    /// Source manufacturer fields (rule 2)
    pub source_manufacturer: Vec<String>,

    /// Destination manufacturer fields (rule 2)
    pub dest_manufacturer: Vec<String>,

    /// Batch number fields (rule 3)
    pub batch_number: Vec<String>,

    /// Source/destination address fields (rule 4)
    pub address: Vec<String>,

    /// Key fragments marking a field as a date or time
    pub temporal_markers: Vec<String>,

    /// Final key words marking a field as a date or time (`shippedAt`, `received_on`)
    pub temporal_suffixes: Vec<String>,
}

impl Default for FieldAliases {
    fn default() -> Self {
        Self {
            storage_condition: strings(&[
                "storagecondition",
                "storageconditions",
                "storage",
                "storagestatus",
                "condition",
                "conditions",
            ]),
            source_manufacturer: strings(&[
                "sourcemanufacturer",
                "sourcemanufacturername",
                "srcmanufacturer",
                "frommanufacturer",
                "manufacturer",
                "manufacturername",
            ]),
            dest_manufacturer: strings(&[
                "destmanufacturer",
                "destmanufacturername",
                "destinationmanufacturer",
                "destinationmanufacturername",
                "tomanufacturer",
            ]),
            batch_number: strings(&["batchno", "batchnumber", "batch", "batchid"]),
            address: strings(&[
                "sourceaddress",
                "destaddress",
                "destinationaddress",
                "fromaddress",
                "toaddress",
                "address",
                "sourcelocation",
                "destinationlocation",
                "location",
                "origin",
                "destination",
            ]),
            temporal_markers: strings(&[
                "date", "time", "expir", "created", "updated", "modified",
            ]),
            temporal_suffixes: strings(&[
                "at", "on", "eta", "ts", "dispatched", "received", "shipped", "delivered",
            ]),
        }
    }
}

/// Configuration for the Evaluator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Field alias lists per rule
    pub fields: FieldAliases,

    /// Words or phrases that mark a storage condition as poor (rule 1)
    pub poor_storage_terms: Vec<String>,

    /// Required batch number prefix (rule 3)
    /// Default: "B"
    pub batch_prefix: String,

    /// Whether the batch prefix comparison is case-sensitive
    /// Default: true
    pub batch_prefix_case_sensitive: bool,

    /// Optional file of extra localities, one per line (rule 4)
    pub gazetteer_path: Option<PathBuf>,

    /// Extra localities added to the built-in gazetteer (rule 4)
    pub extra_localities: Vec<String>,

    /// Whether to consult the reasoning provider when no rule fires
    /// Default: true
    pub heuristic_enabled: bool,

    /// Maximum time for the heuristic call (seconds)
    /// Default: 30
    pub heuristic_timeout_secs: u64,

    /// Longest flag reason kept from the heuristic (characters)
    /// Default: 160
    pub max_reason_chars: usize,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            fields: FieldAliases::default(),
            poor_storage_terms: strings(&[
                "poor",
                "bad",
                "unsafe",
                "improper",
                "inadequate",
                "damaged",
                "broken",
                "compromised",
                "contaminated",
                "spoiled",
                "exposed",
                "breach",
                "breached",
                "excursion",
                "overheated",
                "unrefrigerated",
                "not refrigerated",
                "not maintained",
                "too warm",
                "too hot",
                "humid",
                "leaking",
                "tampered",
            ]),
            batch_prefix: "B".to_string(),
            batch_prefix_case_sensitive: true,
            gazetteer_path: None,
            extra_localities: Vec::new(),
            heuristic_enabled: true,
            heuristic_timeout_secs: 30,
            max_reason_chars: 160,
        }
    }
}

impl EvaluatorConfig {
    /// Get the heuristic timeout as a Duration
    pub fn heuristic_timeout(&self) -> Duration {
        Duration::from_secs(self.heuristic_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.batch_prefix.trim().is_empty() {
            return Err("batch_prefix cannot be empty".to_string());
        }
        if self.poor_storage_terms.iter().all(|t| t.trim().is_empty()) {
            return Err("poor_storage_terms must contain at least one term".to_string());
        }
        if self.heuristic_enabled && self.heuristic_timeout_secs == 0 {
            return Err("heuristic_timeout_secs must be greater than 0".to_string());
        }
        if self.max_reason_chars == 0 {
            return Err("max_reason_chars must be greater than 0".to_string());
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
