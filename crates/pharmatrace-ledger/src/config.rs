//! Configuration for the ledger adapter

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the ledger adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// JSON-RPC endpoint
    /// Default: http://localhost:8545
    pub rpc_url: String,

    /// Registry contract address (0x-prefixed, 20 bytes)
    pub contract_address: String,

    /// Timeout per contract call (seconds)
    /// Default: 15
    pub call_timeout_secs: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            contract_address: String::new(),
            call_timeout_secs: 15,
        }
    }
}

impl LedgerConfig {
    /// Get the call timeout as a Duration
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.rpc_url.starts_with("http://") && !self.rpc_url.starts_with("https://") {
            return Err(format!("rpc_url must be an http(s) URL, got '{}'", self.rpc_url));
        }
        if self.contract_address.trim().is_empty() {
            return Err("contract_address must be set".to_string());
        }
        if self.call_timeout_secs == 0 {
            return Err("call_timeout_secs must be greater than 0".to_string());
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_needs_contract() {
        let config = LedgerConfig::default();
        assert!(config.validate().unwrap_err().contains("contract_address"));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = LedgerConfig::from_toml(
            r#"
            rpc_url = "https://rpc.sepolia.org"
            contract_address = "0x96B560e8485C78f961B9d6FEd035E5811a7A4837"
            "#,
        )
        .unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.call_timeout_secs, 15);
        assert_eq!(LedgerConfig::from_toml(&config.to_toml().unwrap()).unwrap(), config);
    }
}
