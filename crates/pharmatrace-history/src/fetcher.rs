//! Single-record fetch with validation and retry

use crate::config::FetchConfig;
use crate::decode::decode_record;
use pharmatrace_domain::traits::ObjectStore;
use pharmatrace_domain::{FetchError, Record, RecordRef};
use std::fmt::Display;
use std::sync::Arc;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

/// Result of resolving one record, with the number of attempts it took
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    /// The decoded record or the final error
    pub result: Result<Record, FetchError>,

    /// Fetch attempts made (0 when the ref was rejected before fetching)
    pub attempts: u32,
}

/// Resolves a single content address into a [`Record`]
///
/// - Malformed refs fail fast with [`FetchError::InvalidRef`].
/// - Store errors and per-attempt timeouts are [`FetchError::Unavailable`] and
///   are retried with exponential backoff up to `max_attempts`.
/// - Undecodable payloads fail with [`FetchError::Malformed`] and are not retried.
///
/// Cloning is cheap; clones share the same store.
pub struct RecordFetcher<S> {
    store: Arc<S>,
    config: FetchConfig,
}

impl<S> Clone for RecordFetcher<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl<S> RecordFetcher<S>
where
    S: ObjectStore + Send + Sync,
    S::Error: Display + Send,
{
    /// Create a new fetcher
    pub fn new(store: S, config: FetchConfig) -> Self {
        Self::from_shared(Arc::new(store), config)
    }

    /// Create a fetcher over a store that is already shared
    pub fn from_shared(store: Arc<S>, config: FetchConfig) -> Self {
        Self { store, config }
    }

    /// Get the fetch configuration
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetch and decode one record
    pub async fn fetch(&self, record_ref: &RecordRef) -> Result<Record, FetchError> {
        self.fetch_with_attempts(record_ref).await.result
    }

    /// Fetch and decode one record, reporting how many attempts were made
    pub async fn fetch_with_attempts(&self, record_ref: &RecordRef) -> FetchOutcome {
        if let Err(reason) = record_ref.check(self.config.min_ref_len) {
            warn!("Rejecting record ref: {}", reason);
            return FetchOutcome {
                result: Err(FetchError::InvalidRef(reason)),
                attempts: 0,
            };
        }

        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.attempt(record_ref).await {
                Ok(record) => {
                    debug!("Resolved {} on attempt {}", record_ref, attempts);
                    return FetchOutcome {
                        result: Ok(record),
                        attempts,
                    };
                }
                Err(e) if e.is_retryable() && attempts < self.config.max_attempts => {
                    let delay = self.config.backoff_for(attempts);
                    debug!(
                        "Attempt {}/{} for {} failed ({}), retrying in {:?}",
                        attempts, self.config.max_attempts, record_ref, e, delay
                    );
                    sleep(delay).await;
                }
                Err(e) => {
                    warn!(
                        "Giving up on {} after {} attempt(s): {}",
                        record_ref, attempts, e
                    );
                    return FetchOutcome {
                        result: Err(e),
                        attempts,
                    };
                }
            }
        }
    }

    async fn attempt(&self, record_ref: &RecordRef) -> Result<Record, FetchError> {
        let bytes = match timeout(self.config.attempt_timeout(), self.store.fetch(record_ref)).await
        {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(e)) => return Err(FetchError::Unavailable(e.to_string())),
            Err(_) => {
                return Err(FetchError::Unavailable(format!(
                    "timed out after {:?}",
                    self.config.attempt_timeout()
                )))
            }
        };
        decode_record(&bytes)
    }
}
