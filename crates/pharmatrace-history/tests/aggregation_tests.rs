//! Integration tests for pharmatrace-history
//!
//! These tests drive the aggregator through a fake object store and check
//! ordering and partial-failure behaviour end to end.

use pharmatrace_domain::traits::ObjectStore;
use pharmatrace_domain::{Diagnostic, FetchError, FieldValue, RecordRef};
use pharmatrace_history::{AggregatorConfig, FetchConfig, HistoryAggregator};
use proptest::prelude::*;
use std::collections::HashMap;
use std::time::Duration;

const REF_A: &str = "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG";
const REF_B: &str = "QmT78zSuBmuS4z925WZfrqQ1qHaJ56DQaTfyMUF7F8ff5o";

/// Store whose entries either answer after yielding `n` times or fail
struct YieldingStore {
    entries: HashMap<String, (usize, Option<String>)>,
}

impl ObjectStore for YieldingStore {
    type Error = String;

    async fn fetch(&self, record_ref: &RecordRef) -> Result<Vec<u8>, Self::Error> {
        let (yields, payload) = self
            .entries
            .get(record_ref.as_str())
            .cloned()
            .unwrap_or((0, None));
        for _ in 0..yields {
            tokio::task::yield_now().await;
        }
        payload
            .map(String::into_bytes)
            .ok_or_else(|| "gateway timeout".to_string())
    }
}

fn fast_fetch() -> FetchConfig {
    FetchConfig {
        initial_backoff_ms: 1,
        max_backoff_ms: 1,
        ..FetchConfig::default()
    }
}

#[tokio::test]
async fn test_one_record_times_out_after_retry_budget() {
    let mut entries = HashMap::new();
    entries.insert(
        REF_A.to_string(),
        (
            0,
            Some(
                r#"{"storageCondition": "cold-chain maintained", "sourceManufacturer": "Acme",
                    "destManufacturer": "Acme", "batchNo": "B1023"}"#
                    .to_string(),
            ),
        ),
    );
    entries.insert(REF_B.to_string(), (0, None));

    let aggregator = HistoryAggregator::new(
        YieldingStore { entries },
        fast_fetch(),
        AggregatorConfig::default(),
    );
    let chain = vec![RecordRef::new(REF_A), RecordRef::new(REF_B)];
    let aggregation = aggregator.aggregate(&chain, None).await;

    assert_eq!(aggregation.history.len(), 1);
    let entry = &aggregation.history.entries()[0];
    assert_eq!(entry.position, 0);
    assert_eq!(entry.record.get("batchNo"), Some(&FieldValue::Text("B1023".into())));

    assert_eq!(
        aggregation.diagnostics,
        vec![Diagnostic::PartialFetchFailure {
            position: 1,
            record_ref: RecordRef::new(REF_B),
            error: FetchError::Unavailable("gateway timeout".into()),
            attempts: 3,
        }]
    );
}

#[tokio::test]
async fn test_deadline_with_nothing_resolved() {
    struct SlowStore;

    impl ObjectStore for SlowStore {
        type Error = String;

        async fn fetch(&self, _record_ref: &RecordRef) -> Result<Vec<u8>, Self::Error> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(b"{}".to_vec())
        }
    }

    let aggregator = HistoryAggregator::new(SlowStore, FetchConfig::default(), AggregatorConfig::default());
    let deadline = tokio::time::Instant::now() + Duration::from_millis(50);
    let aggregation = aggregator
        .aggregate(&[RecordRef::new(REF_A), RecordRef::new(REF_B)], Some(deadline))
        .await;

    assert!(aggregation.history.is_empty());
    assert_eq!(
        aggregation.diagnostics,
        vec![Diagnostic::DeadlineExceeded {
            resolved: 0,
            abandoned: 2
        }]
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: history keeps chain order among successes, whatever the completion order
    #[test]
    fn test_history_preserves_chain_order(
        plan in proptest::collection::vec((0usize..20, any::<bool>()), 0..24),
        max_in_flight in 1usize..6,
    ) {
        let mut entries = HashMap::new();
        let mut chain = Vec::new();
        let mut expected = Vec::new();
        for (idx, (yields, ok)) in plan.iter().enumerate() {
            let cid = format!("Qm{:0>44}", idx);
            let payload = ok.then(|| format!(r#"{{"seq": {}}}"#, idx));
            if *ok {
                expected.push(idx);
            }
            entries.insert(cid.clone(), (*yields, payload));
            chain.push(RecordRef::new(cid));
        }

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap();
        let aggregation = runtime.block_on(async {
            let aggregator = HistoryAggregator::new(
                YieldingStore { entries },
                fast_fetch(),
                AggregatorConfig { max_in_flight },
            );
            aggregator.aggregate(&chain, None).await
        });

        let positions: Vec<usize> = aggregation.history.entries().iter().map(|e| e.position).collect();
        prop_assert_eq!(&positions, &expected);

        let seqs: Vec<f64> = aggregation
            .history
            .records()
            .filter_map(|r| match r.get("seq") {
                Some(FieldValue::Number(n)) => Some(*n),
                _ => None,
            })
            .collect();
        let expected_seqs: Vec<f64> = expected.iter().map(|&i| i as f64).collect();
        prop_assert_eq!(seqs, expected_seqs);

        prop_assert_eq!(aggregation.diagnostics.len(), plan.len() - expected.len());
    }
}
