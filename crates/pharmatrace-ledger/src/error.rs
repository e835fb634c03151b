//! Error types for the ledger adapter

use thiserror::Error;

/// Errors that can occur while reading the registry
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Item id is not a valid uint256
    #[error("Invalid item id '{0}': expected a decimal or 0x-prefixed uint256")]
    InvalidItemId(String),

    /// RPC URL or contract address is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// RPC call failed or timed out
    #[error("Transport error: {0}")]
    Transport(String),
}
