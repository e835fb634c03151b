//! Ownership Resolver

use crate::error::ResolveError;
use pharmatrace_domain::traits::Ledger;
use pharmatrace_domain::{ItemId, Ownership};
use std::fmt::Display;
use std::sync::Arc;
use tracing::debug;

/// Reads current and prior custodians of an item from the ledger
///
/// A pass-through: no local retry, prior owners keep ledger order.
pub struct OwnershipResolver<L> {
    ledger: Arc<L>,
}

impl<L> Clone for OwnershipResolver<L> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
        }
    }
}

impl<L> OwnershipResolver<L>
where
    L: Ledger + Sync,
    L::Error: Display,
{
    /// Create a resolver over a ledger
    pub fn new(ledger: L) -> Self {
        Self::from_shared(Arc::new(ledger))
    }

    /// Create a resolver over a ledger that is already shared
    pub fn from_shared(ledger: Arc<L>) -> Self {
        Self { ledger }
    }

    /// Resolve ownership; both ledger reads run concurrently
    ///
    /// Errors the ledger classifies as a rejected item id become
    /// [`ResolveError::InvalidItem`]; everything else is an outage.
    pub async fn resolve(&self, item: &ItemId) -> Result<Ownership, ResolveError> {
        let current = async {
            self.ledger
                .current_owner(item)
                .await
                .map_err(|e| classify::<L>("current owner", e))
        };
        let prior = async {
            self.ledger
                .prior_owners(item)
                .await
                .map_err(|e| classify::<L>("prior owners", e))
        };

        let (current, prior) = tokio::try_join!(current, prior)?;
        debug!("Item {} owned by {} ({} prior)", item, current, prior.len());
        Ok(Ownership { current, prior })
    }
}

fn classify<L>(what: &str, error: L::Error) -> ResolveError
where
    L: Ledger,
    L::Error: Display,
{
    if L::rejects_item(&error) {
        ResolveError::InvalidItem(error.to_string())
    } else {
        ResolveError::LedgerUnavailable(format!("{}: {}", what, error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProvenanceError;
    use pharmatrace_domain::{Identity, RecordRef};

    struct StaticLedger {
        fail_prior: bool,
    }

    impl Ledger for StaticLedger {
        type Error = String;

        fn rejects_item(error: &String) -> bool {
            error.starts_with("no such item")
        }

        async fn provenance_chain(&self, _item: &ItemId) -> Result<Vec<RecordRef>, String> {
            Ok(Vec::new())
        }

        async fn current_owner(&self, item: &ItemId) -> Result<Identity, String> {
            if item.as_str() == "unknown" {
                return Err(format!("no such item '{}'", item));
            }
            Ok(Identity::new("0xPharmacy"))
        }

        async fn prior_owners(&self, _item: &ItemId) -> Result<Vec<Identity>, String> {
            if self.fail_prior {
                Err("connection reset".to_string())
            } else {
                Ok(vec![Identity::new("0xMaker"), Identity::new("0xDistributor")])
            }
        }
    }

    #[tokio::test]
    async fn test_resolve_keeps_ledger_order() {
        let resolver = OwnershipResolver::new(StaticLedger { fail_prior: false });
        let ownership = resolver.resolve(&ItemId::parse("7").unwrap()).await.unwrap();

        assert_eq!(ownership.current.as_str(), "0xPharmacy");
        let prior: Vec<&str> = ownership.prior.iter().map(Identity::as_str).collect();
        assert_eq!(prior, vec!["0xMaker", "0xDistributor"]);
    }

    #[tokio::test]
    async fn test_any_read_failure_is_ledger_unavailable() {
        let resolver = OwnershipResolver::new(StaticLedger { fail_prior: true });
        let err = resolver.resolve(&ItemId::parse("7").unwrap()).await.unwrap_err();

        assert_eq!(
            err,
            ResolveError::LedgerUnavailable("prior owners: connection reset".to_string())
        );
    }

    #[tokio::test]
    async fn test_rejected_item_is_invalid_item() {
        let resolver = OwnershipResolver::new(StaticLedger { fail_prior: false });
        let err = resolver
            .resolve(&ItemId::parse("unknown").unwrap())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ResolveError::InvalidItem("no such item 'unknown'".to_string())
        );
        assert!(matches!(
            ProvenanceError::from(err),
            ProvenanceError::InvalidInput(_)
        ));
    }
}
