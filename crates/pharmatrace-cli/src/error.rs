//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provenance request failed
    #[error(transparent)]
    Provenance(#[from] pharmatrace_service::ProvenanceError),

    /// Service could not be assembled
    #[error(transparent)]
    Service(#[from] pharmatrace_service::ConfigError),

    /// Evaluator could not be assembled
    #[error(transparent)]
    Evaluator(#[from] pharmatrace_evaluator::EvaluatorError),

    /// Ledger adapter error
    #[error("Ledger error: {0}")]
    Ledger(#[from] pharmatrace_ledger::LedgerError),

    /// Object store adapter error
    #[error("Object store error: {0}")]
    Store(#[from] pharmatrace_ipfs::GatewayError),

    /// Reasoning backend error
    #[error("Reasoning backend error: {0}")]
    Reasoning(#[from] pharmatrace_llm::LlmError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
