//! Provenance Service: the composition root

use crate::config::ProvenanceConfig;
use crate::error::{ConfigError, ProvenanceError};
use crate::ownership::OwnershipResolver;
use chrono::NaiveDate;
use pharmatrace_domain::traits::{Ledger, ObjectStore, ReasoningProvider};
use pharmatrace_domain::{
    Diagnostic, History, Identity, ItemId, Ownership, Verdict, VerdictSource,
};
use pharmatrace_evaluator::{Evaluator, NoHeuristic};
use pharmatrace_history::{Aggregation, HistoryAggregator};
use std::fmt::Display;
use std::sync::Arc;
use tokio::time::{timeout_at, Instant};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

/// Everything known about one item after a provenance request
#[derive(Debug, Clone, PartialEq)]
pub struct ProvenanceResult {
    /// Unique id of this request (UUIDv7)
    pub request_id: Uuid,

    /// The item that was looked up
    pub item_id: ItemId,

    /// Records that resolved, in chain order
    pub history: History,

    /// Non-fatal problems, in the order they arose
    pub diagnostics: Vec<Diagnostic>,

    /// Current and prior custodians
    pub ownership: Ownership,

    /// The verdict
    pub verdict: Verdict,

    /// Which evaluation layer produced the verdict
    pub verdict_source: VerdictSource,

    /// Date the evaluator treated as "today"
    pub reference_date: NaiveDate,
}

impl ProvenanceResult {
    /// Current custodian
    pub fn current_owner(&self) -> &Identity {
        &self.ownership.current
    }

    /// Prior custodians, oldest first
    pub fn prior_owners(&self) -> &[Identity] {
        &self.ownership.prior
    }

    /// Whether the history was reconstructed and evaluated without any problem
    ///
    /// `false` means "could not fully reconstruct", which is distinct from
    /// a flagged verdict.
    pub fn is_complete(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Reconstructs and evaluates the provenance of scanned items
///
/// Holds no per-request state: every call recomputes from the ledger and
/// object store.
pub struct ProvenanceService<L, S, R = NoHeuristic> {
    ledger: Arc<L>,
    resolver: OwnershipResolver<L>,
    aggregator: HistoryAggregator<S>,
    evaluator: Evaluator<R>,
    config: ProvenanceConfig,
}

impl<L, S> ProvenanceService<L, S, NoHeuristic>
where
    L: Ledger + Send + Sync,
    L::Error: Display + Send,
    S: ObjectStore + Send + Sync + 'static,
    S::Error: Display + Send,
{
    /// Service that evaluates with the deterministic rules only
    pub fn deterministic(ledger: L, store: S, config: ProvenanceConfig) -> Result<Self, ConfigError> {
        Self::new(ledger, store, None, config)
    }
}

impl<L, S, R> ProvenanceService<L, S, R>
where
    L: Ledger + Send + Sync,
    L::Error: Display + Send,
    S: ObjectStore + Send + Sync + 'static,
    S::Error: Display + Send,
    R: ReasoningProvider + Sync,
    R::Error: Display,
{
    /// Create a service
    ///
    /// `heuristic` is consulted only when no deterministic rule fires.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid or the
    /// gazetteer file cannot be loaded.
    pub fn new(
        ledger: L,
        store: S,
        heuristic: Option<R>,
        config: ProvenanceConfig,
    ) -> Result<Self, ConfigError> {
        config.validate().map_err(ConfigError::Invalid)?;

        let ledger = Arc::new(ledger);
        let evaluator = Evaluator::from_config(config.evaluator.clone(), heuristic)?;
        Ok(Self {
            resolver: OwnershipResolver::from_shared(Arc::clone(&ledger)),
            ledger,
            aggregator: HistoryAggregator::new(
                store,
                config.fetch.clone(),
                config.aggregator.clone(),
            ),
            evaluator,
            config,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &ProvenanceConfig {
        &self.config
    }

    /// Look up an item using the configured request budget
    pub async fn lookup(&self, raw_item_id: &str) -> Result<ProvenanceResult, ProvenanceError> {
        self.get_provenance(raw_item_id, Instant::now() + self.config.deadline())
            .await
    }

    /// Reconstruct an item's provenance and evaluate it
    ///
    /// Ownership and history are resolved concurrently. If `deadline` passes
    /// while records are still being fetched, the records already resolved
    /// are kept and a `DeadlineExceeded` diagnostic is attached.
    ///
    /// # Errors
    ///
    /// - [`ProvenanceError::InvalidInput`] if the item id is empty
    /// - [`ProvenanceError::LedgerUnavailable`] if ownership cannot be read
    ///   before the deadline
    pub async fn get_provenance(
        &self,
        raw_item_id: &str,
        deadline: Instant,
    ) -> Result<ProvenanceResult, ProvenanceError> {
        let item = ItemId::parse(raw_item_id).map_err(ProvenanceError::InvalidInput)?;
        let request_id = Uuid::now_v7();
        let span = info_span!("provenance", %request_id, item = %item);

        self.run(request_id, item, deadline).instrument(span).await
    }

    async fn run(
        &self,
        request_id: Uuid,
        item: ItemId,
        deadline: Instant,
    ) -> Result<ProvenanceResult, ProvenanceError> {
        let started = Instant::now();
        let reference_date = self.config.reference_date_or_today();

        let ownership = async {
            match timeout_at(deadline, self.resolver.resolve(&item)).await {
                Ok(result) => result.map_err(ProvenanceError::from),
                Err(_) => Err(ProvenanceError::LedgerUnavailable(
                    "ownership lookup did not finish before the deadline".to_string(),
                )),
            }
        };
        let history = async { Ok::<_, ProvenanceError>(self.reconstruct(&item, deadline).await) };

        // An ownership failure ends the request; in-flight fetches are dropped
        let (ownership, aggregation) = tokio::try_join!(ownership, history).inspect_err(|e| {
            warn!("Provenance request failed: {}", e);
        })?;

        let Aggregation {
            history,
            mut diagnostics,
        } = aggregation;

        let evaluation = self
            .evaluator
            .evaluate_until(&history, reference_date, Some(deadline))
            .await;
        diagnostics.extend(evaluation.diagnostics);

        info!(
            "Verdict {} ({}) from {} record(s), {} diagnostic(s) in {:?}",
            evaluation.verdict,
            evaluation.source,
            history.len(),
            diagnostics.len(),
            started.elapsed()
        );

        Ok(ProvenanceResult {
            request_id,
            item_id: item,
            history,
            diagnostics,
            ownership,
            verdict: evaluation.verdict,
            verdict_source: evaluation.source,
            reference_date,
        })
    }

    /// Read the provenance chain and aggregate it; never fails
    async fn reconstruct(&self, item: &ItemId, deadline: Instant) -> Aggregation {
        let chain = match timeout_at(deadline, self.ledger.provenance_chain(item)).await {
            Ok(Ok(chain)) => chain,
            Ok(Err(e)) => {
                warn!("Provenance chain unavailable: {}", e);
                return Aggregation {
                    history: History::new(),
                    diagnostics: vec![Diagnostic::ChainUnavailable {
                        reason: e.to_string(),
                    }],
                };
            }
            Err(_) => {
                warn!("Deadline passed before the provenance chain was read");
                return Aggregation {
                    history: History::new(),
                    diagnostics: vec![Diagnostic::DeadlineExceeded {
                        resolved: 0,
                        abandoned: 0,
                    }],
                };
            }
        };

        self.aggregator.aggregate(&chain, Some(deadline)).await
    }
}
