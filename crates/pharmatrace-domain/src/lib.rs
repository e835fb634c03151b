//! Pharmatrace Domain Layer
//!
//! Core value types and collaborator interfaces for reconstructing the
//! provenance of a tracked medicine batch. This crate has no third-party
//! dependencies; infrastructure (ledger, object store, reasoning service)
//! lives in other crates and plugs in through the traits in [`traits`].
//!
//! ## Key Concepts
//!
//! - **ItemId**: the tracked item as named on the ledger
//! - **RecordRef**: a content address naming one immutable record payload
//! - **Record**: an open mapping of field names to scalar values
//! - **History**: the records that resolved, in ledger order
//! - **Ownership**: current custodian plus prior custodians, oldest first
//! - **Verdict**: `Legitimate` or `Flagged(reason)`
//! - **Diagnostic**: a non-fatal condition observed while building a result

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod diagnostic;
pub mod history;
pub mod item;
pub mod record;
pub mod traits;
pub mod verdict;

// Re-exports for convenience
pub use diagnostic::{Diagnostic, FetchError};
pub use history::{History, HistoryEntry, Ownership};
pub use item::{Identity, ItemId};
pub use record::{FieldValue, Record, RecordRef};
pub use verdict::{RuleKind, Verdict, VerdictSource};
