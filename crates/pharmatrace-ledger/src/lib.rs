//! Pharmatrace Ledger Adapter
//!
//! Read-only [`Ledger`](pharmatrace_domain::traits::Ledger) implementation
//! over the medicine registry contract, via Ethereum JSON-RPC.
//!
//! The registry maps a numeric medicine id to:
//!
//! - the ordered list of IPFS content addresses of its records
//! - its current owner
//! - its previous owners, oldest first

#![warn(missing_docs)]

pub mod config;
pub mod contract;
pub mod error;
pub mod ledger;

pub use config::LedgerConfig;
pub use error::LedgerError;
pub use ledger::EthLedger;
