//! Concurrent, order-preserving history aggregation

use crate::config::{AggregatorConfig, FetchConfig};
use crate::fetcher::{FetchOutcome, RecordFetcher};
use pharmatrace_domain::traits::ObjectStore;
use pharmatrace_domain::{Diagnostic, FetchError, History, HistoryEntry, RecordRef};
use std::fmt::Display;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

/// Best-effort history plus everything that went wrong building it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    /// Records that resolved, in chain order
    pub history: History,

    /// Skipped records and deadline expiry, in chain order
    pub diagnostics: Vec<Diagnostic>,
}

/// Fetches every ref in a provenance chain and merges the results
///
/// A failing ref never fails the aggregation: it is skipped and reported as
/// [`Diagnostic::PartialFetchFailure`]. Fetches complete in any order but the
/// resulting history always follows chain order.
pub struct HistoryAggregator<S> {
    fetcher: RecordFetcher<S>,
    config: AggregatorConfig,
}

impl<S> HistoryAggregator<S>
where
    S: ObjectStore + Send + Sync + 'static,
    S::Error: Display + Send,
{
    /// Create a new aggregator over a store
    pub fn new(store: S, fetch_config: FetchConfig, config: AggregatorConfig) -> Self {
        Self::with_fetcher(RecordFetcher::new(store, fetch_config), config)
    }

    /// Create an aggregator around an existing fetcher
    pub fn with_fetcher(fetcher: RecordFetcher<S>, config: AggregatorConfig) -> Self {
        Self { fetcher, config }
    }

    /// Get the aggregator configuration
    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Resolve a provenance chain into a history
    ///
    /// If `deadline` passes before every fetch settles, in-flight fetches are
    /// abandoned, records already resolved are kept, and a
    /// [`Diagnostic::DeadlineExceeded`] is appended.
    pub async fn aggregate(&self, chain: &[RecordRef], deadline: Option<Instant>) -> Aggregation {
        if chain.is_empty() {
            debug!("Empty provenance chain, nothing to fetch");
            return Aggregation::default();
        }

        info!(
            "Aggregating {} record(s) with at most {} in flight",
            chain.len(),
            self.config.max_in_flight
        );

        let permits = Arc::new(Semaphore::new(self.config.max_in_flight.max(1)));
        let mut tasks = JoinSet::new();

        for (position, record_ref) in chain.iter().cloned().enumerate() {
            let fetcher = self.fetcher.clone();
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                let outcome = match permits.acquire_owned().await {
                    Ok(_permit) => fetcher.fetch_with_attempts(&record_ref).await,
                    Err(_) => FetchOutcome {
                        result: Err(FetchError::Unavailable("fetch pool closed".to_string())),
                        attempts: 0,
                    },
                };
                (position, record_ref, outcome)
            });
        }

        let mut settled = vec![false; chain.len()];
        let mut entries = Vec::new();
        let mut failures = Vec::new();
        let mut deadline_hit = false;

        loop {
            let next = match deadline {
                Some(deadline) => match timeout_at(deadline, tasks.join_next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        deadline_hit = true;
                        break;
                    }
                },
                None => tasks.join_next().await,
            };

            let Some(joined) = next else { break };

            match joined {
                Ok((position, record_ref, outcome)) => {
                    settled[position] = true;
                    match outcome.result {
                        Ok(record) => entries.push(HistoryEntry {
                            position,
                            record_ref,
                            record,
                        }),
                        Err(error) => failures.push(Diagnostic::PartialFetchFailure {
                            position,
                            record_ref,
                            error,
                            attempts: outcome.attempts,
                        }),
                    }
                }
                Err(e) => warn!("Fetch task failed: {}", e),
            }
        }

        let mut diagnostics = failures;
        let abandoned = settled.iter().filter(|done| !**done).count();

        if deadline_hit {
            tasks.abort_all();
            warn!(
                "Deadline exceeded: {} resolved, {} abandoned",
                entries.len(),
                abandoned
            );
            diagnostics.push(Diagnostic::DeadlineExceeded {
                resolved: entries.len(),
                abandoned,
            });
        } else if abandoned > 0 {
            // Only a panicked or cancelled task leaves a slot unsettled here
            for (position, record_ref) in chain.iter().enumerate() {
                if !settled[position] {
                    diagnostics.push(Diagnostic::PartialFetchFailure {
                        position,
                        record_ref: record_ref.clone(),
                        error: FetchError::Unavailable("fetch task failed".to_string()),
                        attempts: 0,
                    });
                }
            }
        }

        diagnostics.sort_by_key(diagnostic_order);

        let history = History::from_entries(entries);
        info!(
            "Aggregation complete: {} resolved, {} diagnostic(s)",
            history.len(),
            diagnostics.len()
        );

        Aggregation {
            history,
            diagnostics,
        }
    }
}

/// Per-record diagnostics in chain order, anything else after them
fn diagnostic_order(diagnostic: &Diagnostic) -> usize {
    match diagnostic {
        Diagnostic::PartialFetchFailure { position, .. } => *position,
        _ => usize::MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::sleep;

    fn cid(n: usize) -> String {
        format!("Qm{:0>44}", n)
    }

    /// Store with per-ref delays and an in-flight high-water mark
    #[derive(Default)]
    struct ScriptedStore {
        payloads: HashMap<String, String>,
        delays_ms: HashMap<String, u64>,
        in_flight: AtomicUsize,
        peak_in_flight: AtomicUsize,
    }

    impl ScriptedStore {
        fn serve(mut self, cid: &str, payload: &str, delay_ms: u64) -> Self {
            self.payloads.insert(cid.to_string(), payload.to_string());
            self.delays_ms.insert(cid.to_string(), delay_ms);
            self
        }
    }

    impl ObjectStore for ScriptedStore {
        type Error = String;

        async fn fetch(&self, record_ref: &RecordRef) -> Result<Vec<u8>, Self::Error> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

            let delay = self.delays_ms.get(record_ref.as_str()).copied().unwrap_or(0);
            sleep(Duration::from_millis(delay)).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.payloads
                .get(record_ref.as_str())
                .map(|p| p.as_bytes().to_vec())
                .ok_or_else(|| format!("{} not pinned", record_ref))
        }
    }

    fn fast_fetch() -> FetchConfig {
        FetchConfig {
            initial_backoff_ms: 1,
            max_backoff_ms: 2,
            attempt_timeout_ms: 5_000,
            ..FetchConfig::default()
        }
    }

    fn batch_of(aggregation: &Aggregation) -> Vec<String> {
        aggregation
            .history
            .records()
            .map(|r| r.get("batchNo").map(|v| v.to_string()).unwrap_or_default())
            .collect()
    }

    #[tokio::test]
    async fn test_empty_chain_is_empty_history() {
        let aggregator =
            HistoryAggregator::new(ScriptedStore::default(), fast_fetch(), AggregatorConfig::default());
        let aggregation = aggregator.aggregate(&[], None).await;
        assert!(aggregation.history.is_empty());
        assert!(aggregation.diagnostics.is_empty());
    }

    #[tokio::test]
    async fn test_order_preserved_when_completion_reversed() {
        // Earlier refs take longer, so they complete last
        let mut store = ScriptedStore::default();
        let mut chain = Vec::new();
        for i in 0..5 {
            store = store.serve(&cid(i), &format!(r#"{{"batchNo": "B{}"}}"#, i), (5 - i as u64) * 10);
            chain.push(RecordRef::new(cid(i)));
        }

        let aggregator = HistoryAggregator::new(store, fast_fetch(), AggregatorConfig::default());
        let aggregation = aggregator.aggregate(&chain, None).await;

        assert_eq!(batch_of(&aggregation), vec!["B0", "B1", "B2", "B3", "B4"]);
        assert!(aggregation.diagnostics.is_empty());
    }

    #[tokio::test]
    async fn test_partial_failure_is_skipped_and_reported() {
        let store = ScriptedStore::default()
            .serve(&cid(0), r#"{"batchNo": "B0"}"#, 0)
            .serve(&cid(2), r#"{"batchNo": "B2"}"#, 0);
        let chain = vec![
            RecordRef::new(cid(0)),
            RecordRef::new(cid(1)),
            RecordRef::new(cid(2)),
            RecordRef::new("short"),
        ];

        let aggregator = HistoryAggregator::new(store, fast_fetch(), AggregatorConfig::default());
        let aggregation = aggregator.aggregate(&chain, None).await;

        assert_eq!(batch_of(&aggregation), vec!["B0", "B2"]);
        assert_eq!(aggregation.diagnostics.len(), 2);
        match &aggregation.diagnostics[0] {
            Diagnostic::PartialFetchFailure {
                position,
                error,
                attempts,
                ..
            } => {
                assert_eq!(*position, 1);
                assert!(matches!(error, FetchError::Unavailable(_)));
                assert_eq!(*attempts, 3);
            }
            other => panic!("unexpected diagnostic {:?}", other),
        }
        match &aggregation.diagnostics[1] {
            Diagnostic::PartialFetchFailure { position, error, .. } => {
                assert_eq!(*position, 3);
                assert!(matches!(error, FetchError::InvalidRef(_)));
            }
            other => panic!("unexpected diagnostic {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_in_flight_is_bounded() {
        let mut store = ScriptedStore::default();
        let mut chain = Vec::new();
        for i in 0..12 {
            store = store.serve(&cid(i), "{}", 15);
            chain.push(RecordRef::new(cid(i)));
        }
        let store = Arc::new(store);

        let fetcher = RecordFetcher::from_shared(Arc::clone(&store), fast_fetch());
        let aggregator = HistoryAggregator::with_fetcher(fetcher, AggregatorConfig { max_in_flight: 3 });
        let aggregation = aggregator.aggregate(&chain, None).await;

        assert_eq!(aggregation.history.len(), 12);
        assert!(store.peak_in_flight.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_deadline_keeps_resolved_records() {
        let store = ScriptedStore::default()
            .serve(&cid(0), r#"{"batchNo": "B0"}"#, 0)
            .serve(&cid(1), r#"{"batchNo": "B1"}"#, 10_000);
        let chain = vec![RecordRef::new(cid(0)), RecordRef::new(cid(1))];

        let aggregator = HistoryAggregator::new(store, fast_fetch(), AggregatorConfig::default());
        let deadline = Instant::now() + Duration::from_millis(200);
        let aggregation = aggregator.aggregate(&chain, Some(deadline)).await;

        assert_eq!(batch_of(&aggregation), vec!["B0"]);
        assert_eq!(
            aggregation.diagnostics,
            vec![Diagnostic::DeadlineExceeded {
                resolved: 1,
                abandoned: 1
            }]
        );
    }
}
