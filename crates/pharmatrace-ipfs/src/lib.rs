//! Pharmatrace IPFS Gateway Store
//!
//! [`ObjectStore`](pharmatrace_domain::traits::ObjectStore) implementation that
//! resolves content addresses through an HTTP IPFS gateway
//! (`GET {gateway}/ipfs/{cid}`).
//!
//! # Examples
//!
//! ```no_run
//! use pharmatrace_ipfs::{GatewayStore, StoreConfig};
//!
//! let store = GatewayStore::from_config(&StoreConfig::default()).unwrap();
//! assert_eq!(store.gateway_url(), "https://gateway.pinata.cloud");
//! ```

#![warn(missing_docs)]

use pharmatrace_domain::traits::ObjectStore;
use pharmatrace_domain::RecordRef;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Default public gateway
pub const DEFAULT_GATEWAY: &str = "https://gateway.pinata.cloud";

/// Errors that can occur while fetching from a gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Gateway answered 404 for the content address
    #[error("Content not found: {0}")]
    NotFound(String),

    /// Request timed out
    #[error("Gateway timed out fetching {0}")]
    Timeout(String),

    /// Gateway answered with a non-success status
    #[error("Gateway returned HTTP {status} for {cid}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Content address requested
        cid: String,
    },

    /// Connection or body read failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Invalid gateway configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Configuration for the gateway store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Gateway base URL
    /// Default: https://gateway.pinata.cloud
    pub gateway_url: String,

    /// HTTP request timeout (seconds)
    /// Default: 15
    pub request_timeout_secs: u64,

    /// Largest payload accepted (bytes)
    /// Default: 1 MiB
    pub max_payload_bytes: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            gateway_url: DEFAULT_GATEWAY.to_string(),
            request_timeout_secs: 15,
            max_payload_bytes: 1024 * 1024,
        }
    }
}

impl StoreConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.gateway_url.starts_with("http://") && !self.gateway_url.starts_with("https://") {
            return Err(format!(
                "gateway_url must be an http(s) URL, got '{}'",
                self.gateway_url
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than 0".to_string());
        }
        if self.max_payload_bytes == 0 {
            return Err("max_payload_bytes must be greater than 0".to_string());
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

/// Fetches record payloads from an HTTP IPFS gateway
#[derive(Debug, Clone)]
pub struct GatewayStore {
    gateway: String,
    client: reqwest::Client,
    max_payload_bytes: usize,
}

impl GatewayStore {
    /// Create a store over the given gateway base URL
    pub fn new(gateway: impl Into<String>) -> Result<Self, GatewayError> {
        Self::from_config(&StoreConfig {
            gateway_url: gateway.into(),
            ..Default::default()
        })
    }

    /// Create a store from configuration
    pub fn from_config(config: &StoreConfig) -> Result<Self, GatewayError> {
        config.validate().map_err(GatewayError::Config)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| GatewayError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            gateway: config.gateway_url.trim_end_matches('/').to_string(),
            client,
            max_payload_bytes: config.max_payload_bytes,
        })
    }

    /// Gateway base URL
    pub fn gateway_url(&self) -> &str {
        &self.gateway
    }

    /// Full URL for a content address
    pub fn url_for(&self, record_ref: &RecordRef) -> String {
        format!("{}/ipfs/{}", self.gateway, record_ref)
    }

    async fn get(&self, record_ref: &RecordRef) -> Result<Vec<u8>, GatewayError> {
        let cid = record_ref.to_string();
        let url = self.url_for(record_ref);
        debug!("GET {}", url);

        let classify = |e: reqwest::Error| {
            if e.is_timeout() {
                GatewayError::Timeout(cid.clone())
            } else {
                GatewayError::Transport(e.to_string())
            }
        };
        let too_large = || {
            GatewayError::Transport(format!(
                "payload for {} exceeds {} bytes",
                cid, self.max_payload_bytes
            ))
        };

        let mut response = self.client.get(&url).send().await.map_err(classify)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound(cid.clone()));
        }
        if !status.is_success() {
            return Err(GatewayError::Http {
                status: status.as_u16(),
                cid: cid.clone(),
            });
        }
        if response
            .content_length()
            .is_some_and(|len| len > self.max_payload_bytes as u64)
        {
            return Err(too_large());
        }

        // Chunked bodies carry no length up front; stop as soon as the cap is passed
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(classify)? {
            if body.len() + chunk.len() > self.max_payload_bytes {
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

impl ObjectStore for GatewayStore {
    type Error = GatewayError;

    async fn fetch(&self, record_ref: &RecordRef) -> Result<Vec<u8>, Self::Error> {
        self.get(record_ref).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for() {
        let store = GatewayStore::new("http://127.0.0.1:8080/").unwrap();
        let cid = RecordRef::new("QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG");
        assert_eq!(
            store.url_for(&cid),
            "http://127.0.0.1:8080/ipfs/QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG"
        );
    }

    #[test]
    fn test_config_validation() {
        assert!(StoreConfig::default().validate().is_ok());
        assert!(matches!(
            GatewayStore::new("ipfs.io"),
            Err(GatewayError::Config(_))
        ));
        let config = StoreConfig {
            request_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_toml() {
        let config = StoreConfig::from_toml(r#"gateway_url = "https://ipfs.io""#).unwrap();
        assert_eq!(config.gateway_url, "https://ipfs.io");
        assert_eq!(config.request_timeout_secs, 15);
    }
}
