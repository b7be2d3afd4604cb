//! Hand-written provider doubles shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, Bytes};
use async_trait::async_trait;
use tokio::sync::Notify;

use crate::data::provider::{ChainProvider, ProviderAccessor, ProviderError};
use crate::data::types::ContractLog;

type CallHandler = Box<dyn Fn(Address, &Bytes) -> Result<Bytes, ProviderError> + Send + Sync>;

pub fn sample_address() -> Address {
    "0x5FbDB2315678afecb367f032d93F642f64180aa3".parse().unwrap()
}

pub fn other_address() -> Address {
    "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512".parse().unwrap()
}

pub fn sample_abi_json() -> String {
    r#"[
        {"type":"function","name":"priceToMint","stateMutability":"view",
         "inputs":[{"name":"numTokens","type":"uint256","internalType":"uint256"}],
         "outputs":[{"name":"","type":"uint256","internalType":"uint256"}]},
        {"type":"function","name":"rewardForBurn","stateMutability":"view",
         "inputs":[{"name":"numTokens","type":"uint256","internalType":"uint256"}],
         "outputs":[{"name":"","type":"uint256","internalType":"uint256"}]},
        {"type":"function","name":"totalSupply","stateMutability":"view",
         "inputs":[],
         "outputs":[{"name":"","type":"uint256","internalType":"uint256"}]},
        {"type":"function","name":"mint","stateMutability":"payable",
         "inputs":[{"name":"numTokens","type":"uint256","internalType":"uint256"}],
         "outputs":[]},
        {"type":"event","name":"Minted","anonymous":false,
         "inputs":[{"name":"amount","type":"uint256","indexed":false,"internalType":"uint256"},
                   {"name":"totalCost","type":"uint256","indexed":false,"internalType":"uint256"}]}
    ]"#
    .to_string()
}

pub struct MockProvider {
    listening: Result<bool, ProviderError>,
    probe_delay: Option<Duration>,
    code: HashMap<Address, Bytes>,
    code_gates: HashMap<Address, Arc<Notify>>,
    call_handler: Option<CallHandler>,
    logs: Vec<ContractLog>,
    head: u64,
    pub probe_calls: AtomicUsize,
    pub get_code_calls: AtomicUsize,
}

impl MockProvider {
    /// Listening node with no code anywhere.
    pub fn empty() -> Self {
        Self {
            listening: Ok(true),
            probe_delay: None,
            code: HashMap::new(),
            code_gates: HashMap::new(),
            call_handler: None,
            logs: Vec::new(),
            head: 1_000,
            probe_calls: AtomicUsize::new(0),
            get_code_calls: AtomicUsize::new(0),
        }
    }

    /// Listening node with code deployed at [`sample_address`] and [`other_address`].
    pub fn deployed() -> Self {
        Self::empty()
            .with_code(sample_address(), Bytes::from_static(&[0x60, 0x80]))
            .with_code(other_address(), Bytes::from_static(&[0x60, 0x80]))
    }

    pub fn with_listening(mut self, listening: Result<bool, ProviderError>) -> Self {
        self.listening = listening;
        self
    }

    /// The liveness probe sleeps for `delay` before answering.
    pub fn with_probe_delay(mut self, delay: Duration) -> Self {
        self.probe_delay = Some(delay);
        self
    }

    pub fn with_code(mut self, address: Address, code: Bytes) -> Self {
        self.code.insert(address, code);
        self
    }

    /// `get_code` for `address` blocks until `gate` is notified.
    pub fn with_code_gate(mut self, address: Address, gate: Arc<Notify>) -> Self {
        self.code_gates.insert(address, gate);
        self
    }

    pub fn with_call<F>(mut self, handler: F) -> Self
    where
        F: Fn(Address, &Bytes) -> Result<Bytes, ProviderError> + Send + Sync + 'static,
    {
        self.call_handler = Some(Box::new(handler));
        self
    }

    pub fn with_logs(mut self, head: u64, logs: Vec<ContractLog>) -> Self {
        self.head = head;
        self.logs = logs;
        self
    }

    pub fn get_code_count(&self) -> usize {
        self.get_code_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainProvider for MockProvider {
    async fn is_listening(&self) -> Result<bool, ProviderError> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.probe_delay {
            tokio::time::sleep(delay).await;
        }
        self.listening.clone()
    }

    async fn get_code(&self, address: Address) -> Result<Bytes, ProviderError> {
        self.get_code_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = self.code_gates.get(&address) {
            gate.notified().await;
        }
        Ok(self.code.get(&address).cloned().unwrap_or_default())
    }

    async fn block_number(&self) -> Result<u64, ProviderError> {
        Ok(self.head)
    }

    async fn call(&self, to: Address, calldata: Bytes) -> Result<Bytes, ProviderError> {
        match &self.call_handler {
            Some(handler) => handler(to, &calldata),
            None => Err(ProviderError::Rpc("execution reverted".to_string())),
        }
    }

    async fn get_logs(
        &self,
        _address: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<ContractLog>, ProviderError> {
        Ok(self
            .logs
            .iter()
            .filter(|log| log.block_number >= from_block && log.block_number <= to_block)
            .cloned()
            .collect())
    }
}

/// Accessor that hands out a fixed provider, or fails when built with `failing`.
pub struct MockAccessor {
    provider: Option<Arc<MockProvider>>,
    pub calls: AtomicUsize,
}

impl MockAccessor {
    pub fn new(provider: MockProvider) -> Self {
        Self {
            provider: Some(Arc::new(provider)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            provider: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn provider(&self) -> Arc<MockProvider> {
        Arc::clone(self.provider.as_ref().expect("accessor has a provider"))
    }
}

impl ProviderAccessor for MockAccessor {
    fn get_provider(&self) -> Result<Arc<dyn ChainProvider>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.provider {
            Some(provider) => Ok(Arc::clone(provider) as Arc<dyn ChainProvider>),
            None => Err(ProviderError::Rpc("connection refused".to_string())),
        }
    }
}
