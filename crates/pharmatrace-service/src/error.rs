//! Error types for the provenance service

use pharmatrace_evaluator::EvaluatorError;
use thiserror::Error;

/// Errors that abort a provenance request
///
/// Everything else is reported as a diagnostic on the result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProvenanceError {
    /// Item id is empty or malformed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Ownership could not be read from the ledger
    #[error("Ledger unavailable: {0}")]
    LedgerUnavailable(String),
}

/// Errors from the ownership resolver
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The ledger rejected the item id
    #[error("Invalid item: {0}")]
    InvalidItem(String),

    /// Ledger transport failure
    #[error("Ledger unavailable: {0}")]
    LedgerUnavailable(String),
}

impl From<ResolveError> for ProvenanceError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::InvalidItem(reason) => ProvenanceError::InvalidInput(reason),
            ResolveError::LedgerUnavailable(reason) => ProvenanceError::LedgerUnavailable(reason),
        }
    }
}

/// Errors building a service from configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A configuration value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// Evaluator could not be built
    #[error(transparent)]
    Evaluator(#[from] EvaluatorError),
}
