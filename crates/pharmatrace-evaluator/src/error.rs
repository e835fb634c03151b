//! Error types for the Evaluator

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while building an Evaluator
#[derive(Error, Debug)]
pub enum EvaluatorError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Gazetteer file could not be read
    #[error("Gazetteer error: {0}")]
    Gazetteer(String),
}

/// Why the heuristic reasoning pass produced no usable verdict
///
/// Never escapes the Evaluator; it becomes a
/// `HeuristicUnavailable` diagnostic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeuristicError {
    /// Provider returned an error
    #[error("provider error: {0}")]
    Provider(String),

    /// Provider did not answer in time
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Response was not `Legitimate` or `Flagged: <reason>`
    #[error("non-canonical response: {0}")]
    NonCanonical(String),
}
