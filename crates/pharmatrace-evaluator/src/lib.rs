//! Pharmatrace Evaluator
//!
//! Evaluates a reconstructed provenance history and produces exactly one
//! [`Verdict`](pharmatrace_domain::Verdict).
//!
//! # Layers
//!
//! ```text
//! History → RuleEngine (4 deterministic rules, first hit wins)
//!              ↓ no hit
//!           PromptBuilder → ReasoningProvider → parse_verdict
//!              ↓ failure
//!           Legitimate + HeuristicUnavailable diagnostic
//! ```
//!
//! Deterministic rules, in order:
//!
//! 1. **Storage condition** mentions a poor/unsafe term
//! 2. **Manufacturer mismatch** between source and destination names
//! 3. **Batch format** does not start with the expected prefix
//! 4. **Unknown locality** in a source/destination address
//!
//! Date and time fields are invisible to every rule and are stripped from
//! the heuristic prompt, so shifting a timestamp never changes a verdict.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use pharmatrace_domain::{History, Record, Verdict};
//! use pharmatrace_evaluator::{Evaluator, EvaluatorConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let evaluator = Evaluator::deterministic(EvaluatorConfig::default()).unwrap();
//! let history = History::from_records(vec![Record::new().with("batchNo", "X9981")]);
//! let today = NaiveDate::from_ymd_opt(2025, 3, 21).unwrap();
//!
//! let evaluation = evaluator.evaluate(&history, today).await;
//! assert_eq!(
//!     evaluation.verdict,
//!     Verdict::Flagged("batch number does not follow expected format".into())
//! );
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod evaluator;
mod fields;
mod gazetteer;
mod parser;
mod prompt;
mod rules;

pub use config::{EvaluatorConfig, FieldAliases};
pub use error::{EvaluatorError, HeuristicError};
pub use evaluator::{Evaluation, Evaluator, NoHeuristic};
pub use fields::{is_temporal_field, is_temporal_key, is_temporal_value, FieldRole};
pub use gazetteer::Gazetteer;
pub use parser::parse_verdict;
pub use prompt::PromptBuilder;
pub use rules::{RuleEngine, RuleHit};
