//! Trait definitions for external collaborators
//!
//! These traits define the boundaries between the provenance engine and the
//! services it consumes. Implementations live in other crates
//! (pharmatrace-ledger, pharmatrace-ipfs, pharmatrace-llm) or in tests.
//!
//! All methods are read-only and return `Send` futures so callers can fan
//! them out on a multi-threaded runtime.

use crate::{Identity, ItemId, RecordRef};
use std::future::Future;

/// Read-only view of the ledger that anchors item provenance
///
/// Implemented by the infrastructure layer (pharmatrace-ledger)
pub trait Ledger {
    /// Transport error type
    type Error;

    /// Ordered content addresses of the item's records, oldest first
    fn provenance_chain(
        &self,
        item: &ItemId,
    ) -> impl Future<Output = Result<Vec<RecordRef>, Self::Error>> + Send;

    /// Current custodian of the item
    fn current_owner(
        &self,
        item: &ItemId,
    ) -> impl Future<Output = Result<Identity, Self::Error>> + Send;

    /// Prior custodians of the item, oldest first
    fn prior_owners(
        &self,
        item: &ItemId,
    ) -> impl Future<Output = Result<Vec<Identity>, Self::Error>> + Send;

    /// Whether `error` means the ledger rejected the item id itself
    ///
    /// Such errors are bad input, not an outage. Defaults to `false`.
    fn rejects_item(_error: &Self::Error) -> bool {
        false
    }
}

/// Content-addressed object store holding record payloads
///
/// Implemented by the infrastructure layer (pharmatrace-ipfs)
pub trait ObjectStore {
    /// Not-found, timeout or transport error type
    type Error;

    /// Fetch the raw bytes stored under a content address
    fn fetch(
        &self,
        record_ref: &RecordRef,
    ) -> impl Future<Output = Result<Vec<u8>, Self::Error>> + Send;
}

/// Natural-language reasoning service used for the heuristic rule
///
/// Text in, text out. The response is expected (not guaranteed) to be
/// `Legitimate` or `Flagged: <reason>`; callers must tolerate formatting noise around it.
///
/// Implemented by the infrastructure layer (pharmatrace-llm)
pub trait ReasoningProvider {
    /// Error type for provider operations
    type Error;

    /// Generate a completion for the prompt
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, Self::Error>> + Send;

    /// Model name, for logs and result metadata
    fn model_name(&self) -> &str;
}
