//! Check command implementation.
//!
//! Evaluates records from a local JSON file with the same evaluator the
//! lookup path uses. No ledger or object store is contacted.

use super::heuristic_backend;
use crate::cli::CheckArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use pharmatrace_domain::{History, Record, Verdict};
use pharmatrace_evaluator::Evaluator;
use pharmatrace_history::decode_record;
use serde_json::Value;
use tracing::info;

/// Execute the check command.
pub async fn execute_check(
    args: CheckArgs,
    config: &Config,
    formatter: &Formatter,
) -> Result<Verdict> {
    let contents = tokio::fs::read(&args.file).await?;
    let history = History::from_records(parse_records(&contents)?);

    let mut policy = config.provenance.clone();
    if let Some(date) = args.evaluation.date {
        policy.reference_date = Some(date);
    }
    let reference_date = policy.reference_date_or_today();

    let heuristic = heuristic_backend(&config.reasoning, &args.evaluation)?;
    let evaluator = Evaluator::from_config(policy.evaluator, heuristic)?;
    let evaluation = evaluator.evaluate(&history, reference_date).await;
    info!(
        file = %args.file.display(),
        records = history.len(),
        source = %evaluation.source,
        "Checked local history"
    );

    println!(
        "{}",
        formatter.format_check(&history, &evaluation, reference_date)?
    );
    Ok(evaluation.verdict)
}

/// Parse a JSON array of record objects, oldest first.
///
/// Each element is decoded exactly like a fetched payload.
pub fn parse_records(bytes: &[u8]) -> Result<Vec<Record>> {
    let value: Value = serde_json::from_slice(bytes)?;
    let Value::Array(items) = value else {
        return Err(CliError::InvalidInput(
            "expected a JSON array of record objects".to_string(),
        ));
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let raw = serde_json::to_vec(item)?;
            decode_record(&raw)
                .map_err(|e| CliError::InvalidInput(format!("record #{}: {}", index, e)))
        })
        .collect()
}
