use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, Bytes};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{Filter, TransactionRequest};
use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::data::types::ContractLog;

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("invalid RPC URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("no RPC endpoint configured")]
    NotConfigured,
}

/// Connectivity to an EVM chain, as seen by the connection manager and the
/// visualizations.
#[async_trait]
pub trait ChainProvider: Send + Sync {
    /// Liveness probe. `Ok(false)` means the node answered but is not serving.
    async fn is_listening(&self) -> Result<bool, ProviderError>;

    /// Syntactic address check. Never touches the network.
    fn is_valid_address(&self, address: &str) -> bool {
        is_valid_address(address)
    }

    /// Deployed bytecode at `address`; empty when nothing is deployed.
    async fn get_code(&self, address: Address) -> Result<Bytes, ProviderError>;

    async fn block_number(&self) -> Result<u64, ProviderError>;

    /// `eth_call` against the latest block.
    async fn call(&self, to: Address, calldata: Bytes) -> Result<Bytes, ProviderError>;

    /// Logs emitted by `address` in the inclusive block range.
    async fn get_logs(
        &self,
        address: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<ContractLog>, ProviderError>;
}

/// Yields the provider handle used for an acquisition.
pub trait ProviderAccessor: Send + Sync {
    fn get_provider(&self) -> Result<Arc<dyn ChainProvider>, ProviderError>;
}

/// Address format check: 40 hex digits with an optional `0x` prefix.
/// Mixed-case input must carry a valid EIP-55 checksum.
pub fn is_valid_address(address: &str) -> bool {
    let hex = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .unwrap_or(address);

    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return false;
    }

    let is_lower = !hex.chars().any(|c| c.is_ascii_uppercase());
    let is_upper = !hex.chars().any(|c| c.is_ascii_lowercase());
    if is_lower || is_upper {
        return true;
    }

    Address::parse_checksummed(format!("0x{hex}"), None).is_ok()
}

/// Parse an address that already passed [`is_valid_address`].
pub fn parse_address(address: &str) -> Option<Address> {
    let hex = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .unwrap_or(address);
    format!("0x{hex}").parse().ok()
}

/// Provider backed by an HTTP JSON-RPC endpoint.
pub struct EthProvider {
    provider: Box<dyn Provider + Send + Sync>,
    rpc_url: String,
}

impl EthProvider {
    /// Build a provider for `rpc_url`. No request is made until the first call.
    pub fn connect(rpc_url: &str) -> Result<Self, ProviderError> {
        let url = rpc_url.parse().map_err(|e| ProviderError::InvalidUrl {
            url: rpc_url.to_string(),
            reason: format!("{e}"),
        })?;
        let provider = ProviderBuilder::new().on_http(url);
        Ok(Self {
            provider: Box::new(provider),
            rpc_url: rpc_url.to_string(),
        })
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }
}

#[async_trait]
impl ChainProvider for EthProvider {
    async fn is_listening(&self) -> Result<bool, ProviderError> {
        // Any successful head query means the node is serving requests.
        self.provider
            .get_block_number()
            .await
            .map(|_| true)
            .map_err(|e| ProviderError::Rpc(e.to_string()))
    }

    async fn get_code(&self, address: Address) -> Result<Bytes, ProviderError> {
        self.provider
            .get_code_at(address)
            .await
            .map_err(|e| ProviderError::Rpc(e.to_string()))
    }

    async fn block_number(&self) -> Result<u64, ProviderError> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| ProviderError::Rpc(e.to_string()))
    }

    async fn call(&self, to: Address, calldata: Bytes) -> Result<Bytes, ProviderError> {
        let tx = TransactionRequest::default().to(to).input(calldata.into());
        self.provider
            .call(tx)
            .await
            .map_err(|e| ProviderError::Rpc(e.to_string()))
    }

    async fn get_logs(
        &self,
        address: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<ContractLog>, ProviderError> {
        let filter = Filter::new()
            .address(address)
            .from_block(from_block)
            .to_block(to_block);
        let logs = self
            .provider
            .get_logs(&filter)
            .await
            .map_err(|e| ProviderError::Rpc(e.to_string()))?;

        Ok(logs
            .into_iter()
            .map(|log| ContractLog {
                block_number: log.block_number.unwrap_or_default(),
                block_timestamp: log.block_timestamp,
                transaction_hash: log.transaction_hash,
                topics: log.inner.data.topics().to_vec(),
                data: log.inner.data.data.clone(),
            })
            .collect())
    }
}

/// Lazily builds one [`EthProvider`] per accessor and hands out the same
/// handle on every call.
pub struct HttpProviderAccessor {
    rpc_url: Option<String>,
    provider: Mutex<Option<Arc<EthProvider>>>,
}

impl HttpProviderAccessor {
    pub fn new(rpc_url: Option<String>) -> Self {
        Self {
            rpc_url,
            provider: Mutex::new(None),
        }
    }
}

impl ProviderAccessor for HttpProviderAccessor {
    fn get_provider(&self) -> Result<Arc<dyn ChainProvider>, ProviderError> {
        let mut slot = self
            .provider
            .lock()
            .map_err(|e| ProviderError::Rpc(format!("provider cache poisoned: {e}")))?;

        if let Some(existing) = slot.as_ref() {
            return Ok(Arc::clone(existing) as Arc<dyn ChainProvider>);
        }

        let url = self.rpc_url.as_deref().ok_or(ProviderError::NotConfigured)?;
        let provider = Arc::new(EthProvider::connect(url)?);
        debug!(rpc_url = provider.rpc_url(), "built HTTP provider");
        *slot = Some(Arc::clone(&provider));
        Ok(provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_lowercase_address() {
        assert!(is_valid_address("0xd8da6bf26964af9d7eed9e03e53415d37aa96045"));
    }

    #[test]
    fn test_valid_uppercase_address() {
        assert!(is_valid_address("0xD8DA6BF26964AF9D7EED9E03E53415D37AA96045"));
    }

    #[test]
    fn test_valid_checksummed_address() {
        assert!(is_valid_address("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045"));
    }

    #[test]
    fn test_bad_checksum_rejected() {
        assert!(!is_valid_address("0xd8Da6BF26964aF9D7eEd9e03E53415D37aA96045"));
    }

    #[test]
    fn test_prefix_is_optional() {
        assert!(is_valid_address("d8da6bf26964af9d7eed9e03e53415d37aa96045"));
    }

    #[test]
    fn test_malformed_addresses() {
        assert!(!is_valid_address("0xNotAnAddress"));
        assert!(!is_valid_address(""));
        assert!(!is_valid_address("0x"));
        assert!(!is_valid_address("0xd8da6bf26964af9d7eed9e03e53415d37aa9604"));
        assert!(!is_valid_address("0xd8da6bf26964af9d7eed9e03e53415d37aa960455"));
        assert!(!is_valid_address("0xg8da6bf26964af9d7eed9e03e53415d37aa96045"));
    }

    #[test]
    fn test_parse_address_without_prefix() {
        let parsed = parse_address("d8da6bf26964af9d7eed9e03e53415d37aa96045").unwrap();
        assert_eq!(
            parsed,
            "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045"
                .parse::<Address>()
                .unwrap()
        );
    }

    #[test]
    fn test_accessor_without_url() {
        let accessor = HttpProviderAccessor::new(None);
        assert!(matches!(
            accessor.get_provider(),
            Err(ProviderError::NotConfigured)
        ));
    }

    #[test]
    fn test_accessor_rejects_bad_url() {
        let accessor = HttpProviderAccessor::new(Some("not a url".to_string()));
        assert!(matches!(
            accessor.get_provider(),
            Err(ProviderError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_accessor_caches_provider() {
        let accessor = HttpProviderAccessor::new(Some("http://127.0.0.1:8545".to_string()));
        let a = accessor.get_provider().unwrap();
        let b = accessor.get_provider().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
