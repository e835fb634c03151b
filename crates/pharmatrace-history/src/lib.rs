//! Pharmatrace History
//!
//! Resolves an item's provenance chain into an ordered, gap-tolerant history.
//!
//! # Architecture
//!
//! ```text
//! ProvenanceChain → HistoryAggregator → RecordFetcher (×N, bounded) → ObjectStore
//!                         ↓
//!                  History + Diagnostics
//! ```
//!
//! - [`RecordFetcher`] resolves one content address: validates it, fetches the
//!   payload, decodes it into a [`Record`](pharmatrace_domain::Record), and
//!   retries transient failures with exponential backoff.
//! - [`HistoryAggregator`] fans the whole chain out through the fetcher with a
//!   bounded number of fetches in flight, puts results back in chain order, and
//!   turns per-record failures and deadline expiry into diagnostics instead of
//!   errors.
//!
//! # Example Usage
//!
//! ```no_run
//! use pharmatrace_domain::RecordRef;
//! use pharmatrace_domain::traits::ObjectStore;
//! use pharmatrace_history::{AggregatorConfig, FetchConfig, HistoryAggregator};
//!
//! # async fn example<S>(store: S) where S: ObjectStore + Send + Sync + 'static, S::Error: std::fmt::Display + Send {
//! let aggregator = HistoryAggregator::new(store, FetchConfig::default(), AggregatorConfig::default());
//! let chain = vec![RecordRef::new("QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG")];
//!
//! let aggregation = aggregator.aggregate(&chain, None).await;
//! println!("{} record(s), {} diagnostic(s)",
//!     aggregation.history.len(), aggregation.diagnostics.len());
//! # }
//! ```

#![warn(missing_docs)]

mod aggregator;
mod config;
mod decode;
mod fetcher;

pub use aggregator::{Aggregation, HistoryAggregator};
pub use config::{AggregatorConfig, FetchConfig};
pub use decode::decode_record;
pub use fetcher::{FetchOutcome, RecordFetcher};
