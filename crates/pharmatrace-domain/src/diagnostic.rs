//! Fetch failures and non-fatal diagnostics

use crate::RecordRef;
use std::fmt;

/// Why a single record could not be resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Malformed or too-short content address; never retried
    InvalidRef(String),

    /// Transient network or service failure; retried up to the attempt budget
    Unavailable(String),

    /// Payload fetched but not decodable into a field mapping; never retried
    Malformed(String),
}

impl FetchError {
    /// Whether another attempt could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Unavailable(_))
    }

    /// Short classification name
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::InvalidRef(_) => "invalid_ref",
            FetchError::Unavailable(_) => "unavailable",
            FetchError::Malformed(_) => "malformed",
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::InvalidRef(msg) => write!(f, "Invalid record ref: {}", msg),
            FetchError::Unavailable(msg) => write!(f, "Record unavailable: {}", msg),
            FetchError::Malformed(msg) => write!(f, "Malformed record: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

/// A non-fatal condition recorded alongside a (possibly partial) result
///
/// Diagnostics are kept apart from the verdict so callers can tell
/// "no issues found" from "could not fully reconstruct history".
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// One chain entry could not be resolved and was skipped
    PartialFetchFailure {
        /// Position of the ref in the provenance chain
        position: usize,
        /// The ref that failed
        record_ref: RecordRef,
        /// Final error after retries
        error: FetchError,
        /// Attempts made (0 if the ref never got a fetch slot)
        attempts: u32,
    },

    /// The request deadline passed while fetches were still in flight
    DeadlineExceeded {
        /// Records resolved before the deadline
        resolved: usize,
        /// Chain entries abandoned
        abandoned: usize,
    },

    /// The heuristic reasoning pass failed; verdict fell back to the rules
    HeuristicUnavailable {
        /// What went wrong
        reason: String,
    },

    /// The ledger could not report the provenance chain
    ChainUnavailable {
        /// What went wrong
        reason: String,
    },
}

impl Diagnostic {
    /// Short machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Diagnostic::PartialFetchFailure { .. } => "partial_fetch_failure",
            Diagnostic::DeadlineExceeded { .. } => "deadline_exceeded",
            Diagnostic::HeuristicUnavailable { .. } => "heuristic_unavailable",
            Diagnostic::ChainUnavailable { .. } => "chain_unavailable",
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::PartialFetchFailure {
                position,
                record_ref,
                error,
                attempts,
            } => write!(
                f,
                "record #{} ({}) skipped after {} attempt(s): {}",
                position, record_ref, attempts, error
            ),
            Diagnostic::DeadlineExceeded {
                resolved,
                abandoned,
            } => write!(
                f,
                "deadline exceeded: {} record(s) resolved, {} abandoned",
                resolved, abandoned
            ),
            Diagnostic::HeuristicUnavailable { reason } => {
                write!(f, "heuristic review unavailable: {}", reason)
            }
            Diagnostic::ChainUnavailable { reason } => {
                write!(f, "provenance chain unavailable: {}", reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_unavailable_is_retryable() {
        assert!(FetchError::Unavailable("timeout".into()).is_retryable());
        assert!(!FetchError::InvalidRef("short".into()).is_retryable());
        assert!(!FetchError::Malformed("not json".into()).is_retryable());
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::PartialFetchFailure {
            position: 1,
            record_ref: RecordRef::new("refB"),
            error: FetchError::Unavailable("timed out".into()),
            attempts: 3,
        };
        assert_eq!(diag.code(), "partial_fetch_failure");
        assert_eq!(
            diag.to_string(),
            "record #1 (refB) skipped after 3 attempt(s): Record unavailable: timed out"
        );
    }
}
