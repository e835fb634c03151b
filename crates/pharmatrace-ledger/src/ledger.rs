//! JSON-RPC backed registry reader

use crate::config::LedgerConfig;
use crate::contract::IMedicineRegistry;
use crate::error::LedgerError;
use alloy::primitives::{Address, U256};
use alloy::providers::{Provider, ProviderBuilder};
use pharmatrace_domain::traits::Ledger;
use pharmatrace_domain::{Identity, ItemId, RecordRef};
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Read-only client for the medicine registry contract
#[derive(Debug, Clone)]
pub struct EthLedger {
    rpc_url: String,
    contract_address: Address,
    call_timeout: Duration,
}

impl EthLedger {
    /// Create a ledger client
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Config`] if the RPC URL or contract address is invalid.
    pub fn new(rpc_url: impl Into<String>, contract_address: &str) -> Result<Self, LedgerError> {
        let contract_address = Address::from_str(contract_address.trim()).map_err(|e| {
            LedgerError::Config(format!(
                "Invalid contract address '{}': {}",
                contract_address, e
            ))
        })?;

        let ledger = Self {
            rpc_url: rpc_url.into(),
            contract_address,
            call_timeout: LedgerConfig::default().call_timeout(),
        };
        ledger.provider()?;
        Ok(ledger)
    }

    /// Create a ledger client from configuration
    pub fn from_config(config: &LedgerConfig) -> Result<Self, LedgerError> {
        config.validate().map_err(LedgerError::Config)?;
        Ok(Self::new(config.rpc_url.as_str(), &config.contract_address)?
            .with_call_timeout(config.call_timeout()))
    }

    /// Set the timeout per contract call
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Registry contract address
    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    /// Create a read-only provider for contract calls
    fn provider(&self) -> Result<impl Provider, LedgerError> {
        let rpc_url = self
            .rpc_url
            .parse()
            .map_err(|e| LedgerError::Config(format!("Invalid RPC URL '{}': {}", self.rpc_url, e)))?;
        Ok(ProviderBuilder::new().connect_http(rpc_url))
    }

    async fn timed<T, E: std::fmt::Display>(
        &self,
        what: &str,
        call: impl Future<Output = Result<T, E>>,
    ) -> Result<T, LedgerError> {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(LedgerError::Transport(format!("{} failed: {}", what, e))),
            Err(_) => Err(LedgerError::Transport(format!(
                "{} timed out after {:?}",
                what, self.call_timeout
            ))),
        }
    }
}

/// Parse an item id as the contract's uint256 key
pub(crate) fn item_key(item: &ItemId) -> Result<U256, LedgerError> {
    U256::from_str(item.as_str()).map_err(|_| LedgerError::InvalidItemId(item.to_string()))
}

/// Ledger identities are EIP-55 checksummed addresses
pub(crate) fn identity(address: Address) -> Identity {
    Identity::new(address.to_checksum(None))
}

impl Ledger for EthLedger {
    type Error = LedgerError;

    fn rejects_item(error: &LedgerError) -> bool {
        matches!(error, LedgerError::InvalidItemId(_))
    }

    async fn provenance_chain(&self, item: &ItemId) -> Result<Vec<RecordRef>, Self::Error> {
        let key = item_key(item)?;
        let provider = self.provider()?;
        let registry = IMedicineRegistry::new(self.contract_address, &provider);

        let hashes = self
            .timed(
                "getMedicineIPFSHistory",
                async { registry.getMedicineIPFSHistory(key).call().await },
            )
            .await?;
        debug!("Item {} has {} record(s) on chain", item, hashes.len());
        Ok(hashes.into_iter().map(RecordRef::new).collect())
    }

    async fn current_owner(&self, item: &ItemId) -> Result<Identity, Self::Error> {
        let key = item_key(item)?;
        let provider = self.provider()?;
        let registry = IMedicineRegistry::new(self.contract_address, &provider);

        let owner = self
            .timed(
                "getMedicineOwner",
                async { registry.getMedicineOwner(key).call().await },
            )
            .await?;
        Ok(identity(owner))
    }

    async fn prior_owners(&self, item: &ItemId) -> Result<Vec<Identity>, Self::Error> {
        let key = item_key(item)?;
        let provider = self.provider()?;
        let registry = IMedicineRegistry::new(self.contract_address, &provider);

        let owners = self
            .timed(
                "getPreviousOwners",
                async { registry.getPreviousOwners(key).call().await },
            )
            .await?;
        Ok(owners.into_iter().map(identity).collect())
    }
}
