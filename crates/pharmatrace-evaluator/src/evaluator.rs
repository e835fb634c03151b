//! The Evaluator: rules first, heuristic second, one verdict always

use crate::config::EvaluatorConfig;
use crate::error::{EvaluatorError, HeuristicError};
use crate::parser::parse_verdict;
use crate::prompt::PromptBuilder;
use crate::rules::RuleEngine;
use chrono::NaiveDate;
use pharmatrace_domain::traits::ReasoningProvider;
use pharmatrace_domain::{Diagnostic, History, Verdict, VerdictSource};
use std::convert::Infallible;
use std::fmt::Display;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Outcome of evaluating one history
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// The verdict
    pub verdict: Verdict,

    /// Which layer produced it
    pub source: VerdictSource,

    /// Non-fatal problems met along the way
    pub diagnostics: Vec<Diagnostic>,
}

impl Evaluation {
    fn new(verdict: Verdict, source: VerdictSource) -> Self {
        Self {
            verdict,
            source,
            diagnostics: Vec::new(),
        }
    }
}

/// Placeholder provider for evaluators that never consult a heuristic
///
/// Uninhabited, so an `Evaluator<NoHeuristic>` can only be built without one.
#[derive(Debug, Clone, Copy)]
pub enum NoHeuristic {}

impl ReasoningProvider for NoHeuristic {
    type Error = Infallible;

    async fn generate(&self, _prompt: &str) -> Result<String, Self::Error> {
        match *self {}
    }

    fn model_name(&self) -> &str {
        match *self {}
    }
}

/// Produces exactly one verdict per history
///
/// The four deterministic rules run first in fixed order; the first hit
/// decides. Only if none fires, and the history is non-empty, is the
/// reasoning provider consulted. Provider failures of any kind degrade to
/// `Legitimate` with a `HeuristicUnavailable` diagnostic; evaluation itself
/// never fails.
pub struct Evaluator<R = NoHeuristic> {
    rules: RuleEngine,
    heuristic: Option<R>,
    config: EvaluatorConfig,
}

impl Evaluator<NoHeuristic> {
    /// Rules-only evaluator
    pub fn deterministic(config: EvaluatorConfig) -> Result<Self, EvaluatorError> {
        Self::from_config(config, None)
    }
}

impl<R> Evaluator<R>
where
    R: ReasoningProvider + Sync,
    R::Error: Display,
{
    /// Create an evaluator from configuration, loading the gazetteer
    pub fn from_config(config: EvaluatorConfig, heuristic: Option<R>) -> Result<Self, EvaluatorError> {
        let rules = RuleEngine::from_config(&config)?;
        Ok(Self::new(config, rules, heuristic))
    }

    /// Create an evaluator from an already-built rule engine
    pub fn new(config: EvaluatorConfig, rules: RuleEngine, heuristic: Option<R>) -> Self {
        Self {
            rules,
            heuristic,
            config,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Whether a reasoning provider will be consulted
    pub fn has_heuristic(&self) -> bool {
        self.config.heuristic_enabled && self.heuristic.is_some()
    }

    /// Evaluate a history with no deadline beyond the heuristic timeout
    pub async fn evaluate(&self, history: &History, reference_date: NaiveDate) -> Evaluation {
        self.evaluate_until(history, reference_date, None).await
    }

    /// Evaluate a history, cutting the heuristic short at `deadline`
    pub async fn evaluate_until(
        &self,
        history: &History,
        reference_date: NaiveDate,
        deadline: Option<Instant>,
    ) -> Evaluation {
        if let Some(hit) = self.rules.check(history) {
            info!(
                "Rule {} fired at record #{}: {}",
                hit.kind.as_str(),
                hit.position,
                hit.reason
            );
            return Evaluation::new(Verdict::Flagged(hit.reason), VerdictSource::Rule(hit.kind));
        }

        if history.is_empty() {
            debug!("Empty history; nothing to review");
            return Evaluation::new(Verdict::Legitimate, VerdictSource::NoEvidence);
        }

        let provider = match &self.heuristic {
            Some(provider) if self.config.heuristic_enabled => provider,
            _ => {
                debug!("No rule fired and heuristic review is off");
                return Evaluation::new(Verdict::Legitimate, VerdictSource::NoEvidence);
            }
        };

        match self.consult(provider, history, reference_date, deadline).await {
            Ok(verdict) => {
                info!("Heuristic verdict from {}: {}", provider.model_name(), verdict);
                Evaluation::new(verdict, VerdictSource::Heuristic)
            }
            Err(e) => {
                warn!("Heuristic review failed, defaulting to Legitimate: {}", e);
                let mut evaluation = Evaluation::new(Verdict::Legitimate, VerdictSource::Fallback);
                evaluation.diagnostics.push(Diagnostic::HeuristicUnavailable {
                    reason: e.to_string(),
                });
                evaluation
            }
        }
    }

    async fn consult(
        &self,
        provider: &R,
        history: &History,
        reference_date: NaiveDate,
        deadline: Option<Instant>,
    ) -> Result<Verdict, HeuristicError> {
        let prompt = PromptBuilder::new(reference_date, &self.config).build(history);
        let budget = self.heuristic_budget(deadline);
        debug!(
            "Consulting {} ({} chars, budget {:?})",
            provider.model_name(),
            prompt.len(),
            budget
        );

        let response = tokio::time::timeout(budget, provider.generate(&prompt))
            .await
            .map_err(|_| HeuristicError::Timeout(budget))?
            .map_err(|e| HeuristicError::Provider(e.to_string()))?;

        parse_verdict(&response, self.config.max_reason_chars)
    }

    /// Heuristic timeout, clipped to what is left before the deadline
    fn heuristic_budget(&self, deadline: Option<Instant>) -> Duration {
        let configured = self.config.heuristic_timeout();
        match deadline {
            Some(deadline) => configured.min(deadline.saturating_duration_since(Instant::now())),
            None => configured,
        }
    }
}
