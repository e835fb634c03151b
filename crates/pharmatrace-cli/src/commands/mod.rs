//! Command implementations.

pub mod check;
pub mod config;
pub mod lookup;

pub use self::check::{execute_check, parse_records};
pub use self::config::execute_config;
pub use self::lookup::execute_lookup;

use crate::cli::EvaluationArgs;
use crate::error::Result;
use pharmatrace_domain::Verdict;
use pharmatrace_llm::{ReasoningBackend, ReasoningConfig};

/// Process exit status for a verdict: 0 legitimate, 2 flagged.
pub fn exit_code(verdict: &Verdict) -> i32 {
    if verdict.is_flagged() {
        2
    } else {
        0
    }
}

/// Build the configured reasoning backend unless the command disabled it.
pub(crate) fn heuristic_backend(
    config: &ReasoningConfig,
    args: &EvaluationArgs,
) -> Result<Option<ReasoningBackend>> {
    if args.no_heuristic {
        return Ok(None);
    }
    Ok(ReasoningBackend::from_config(config)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pharmatrace_llm::ProviderKind;

    #[test]
    fn test_exit_code() {
        assert_eq!(exit_code(&Verdict::Legitimate), 0);
        assert_eq!(exit_code(&Verdict::Flagged("x".into())), 2);
    }

    #[test]
    fn test_no_heuristic_skips_backend() {
        // Would fail with a missing API key if it were built
        let config = ReasoningConfig {
            provider: ProviderKind::Gemini,
            api_key_env: "PHARMATRACE_TEST_UNSET_KEY".into(),
            ..Default::default()
        };
        let args = EvaluationArgs {
            no_heuristic: true,
            ..Default::default()
        };
        assert!(heuristic_backend(&config, &args).unwrap().is_none());
    }

    #[test]
    fn test_missing_key_is_an_error() {
        let config = ReasoningConfig {
            provider: ProviderKind::Gemini,
            api_key_env: "PHARMATRACE_TEST_UNSET_KEY".into(),
            ..Default::default()
        };
        let result = heuristic_backend(&config, &EvaluationArgs::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_mock_backend() {
        let config = ReasoningConfig {
            provider: ProviderKind::Mock,
            ..Default::default()
        };
        assert!(heuristic_backend(&config, &EvaluationArgs::default())
            .unwrap()
            .is_some());
    }
}
