//! Lookup command implementation.

use super::heuristic_backend;
use crate::cli::LookupArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use pharmatrace_domain::Verdict;
use pharmatrace_ipfs::GatewayStore;
use pharmatrace_ledger::EthLedger;
use pharmatrace_service::{ProvenanceConfig, ProvenanceService};
use tracing::debug;

/// Execute the lookup command.
pub async fn execute_lookup(
    args: LookupArgs,
    config: &Config,
    formatter: &Formatter,
) -> Result<Verdict> {
    config.validate_ledger()?;

    let provenance = lookup_config(&config.provenance, &args);
    let ledger = EthLedger::from_config(&config.ledger)?;
    let store = GatewayStore::from_config(&config.store)?;
    let heuristic = heuristic_backend(&config.reasoning, &args.evaluation)?;
    debug!(
        contract = %ledger.contract_address(),
        gateway = store.gateway_url(),
        heuristic = heuristic.is_some(),
        "Looking up item"
    );

    let service = ProvenanceService::new(ledger, store, heuristic, provenance)?;
    let result = service.lookup(&args.item).await?;

    println!("{}", formatter.format_provenance(&result)?);
    Ok(result.verdict)
}

/// Apply command-line overrides to the configured policy.
fn lookup_config(base: &ProvenanceConfig, args: &LookupArgs) -> ProvenanceConfig {
    let mut config = base.clone();
    if let Some(secs) = args.deadline {
        config.deadline_secs = secs;
    }
    if let Some(date) = args.evaluation.date {
        config.reference_date = Some(date);
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::EvaluationArgs;
    use chrono::NaiveDate;

    #[test]
    fn test_overrides() {
        let args = LookupArgs {
            item: "7".into(),
            deadline: Some(5),
            evaluation: EvaluationArgs {
                date: NaiveDate::from_ymd_opt(2024, 3, 9),
                no_heuristic: false,
            },
        };
        let config = lookup_config(&ProvenanceConfig::default(), &args);
        assert_eq!(config.deadline_secs, 5);
        assert_eq!(config.reference_date, NaiveDate::from_ymd_opt(2024, 3, 9));
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let base = ProvenanceConfig {
            deadline_secs: 42,
            ..Default::default()
        };
        let args = LookupArgs {
            item: "7".into(),
            deadline: None,
            evaluation: EvaluationArgs::default(),
        };
        assert_eq!(lookup_config(&base, &args), base);
    }
}
