//! Pharmatrace Provenance Service
//!
//! Composition root: turns a scanned item id into a complete provenance
//! report.
//!
//! # Architecture
//!
//! ```text
//!                      ┌─ OwnershipResolver ─→ Ledger (owner, prior owners)
//! get_provenance(id) ──┤
//!                      └─ Ledger (chain) ─→ HistoryAggregator ─→ ObjectStore
//!                                                  ↓
//!                                              Evaluator ─→ ReasoningProvider
//!                                                  ↓
//!                                          ProvenanceResult
//! ```
//!
//! Ownership and history are resolved concurrently. Only an invalid item id
//! or an ownership lookup failure aborts a request; everything else degrades
//! into [`Diagnostic`](pharmatrace_domain::Diagnostic)s on a well-formed result.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod ownership;
pub mod service;

pub use config::ProvenanceConfig;
pub use error::{ConfigError, ProvenanceError, ResolveError};
pub use ownership::OwnershipResolver;
pub use service::{ProvenanceResult, ProvenanceService};
