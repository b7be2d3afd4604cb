use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::data::artifact::{ContractArtifact, ContractHandle};
use crate::data::provider::ChainProvider;

/// Identity of one `acquire` call. Later requests compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub(crate) u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What to connect to. Superseded by the next request, never mutated.
#[derive(Debug, Clone)]
pub struct ConnectionRequest {
    pub address: String,
    pub artifact: Arc<ContractArtifact>,
}

/// Handles produced by a successful acquisition. Consumers treat them as read-only.
#[derive(Clone)]
pub struct ReadyConnection {
    pub provider: Arc<dyn ChainProvider>,
    pub contract: Arc<ContractHandle>,
}

impl fmt::Debug for ReadyConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadyConnection")
            .field("contract", &self.contract.address())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureReason {
    #[error("Invalid address")]
    InvalidAddress,

    #[error("Invalid contract")]
    ContractNotDeployed,

    #[error("Provider unreachable: {0}")]
    ProviderUnreachable(String),

    #[error("{0}")]
    Unexpected(String),
}

impl FailureReason {
    /// The nested cause, for variants that wrap one.
    pub fn cause(&self) -> Option<&str> {
        match self {
            FailureReason::ProviderUnreachable(cause) | FailureReason::Unexpected(cause) => {
                Some(cause)
            }
            FailureReason::InvalidAddress | FailureReason::ContractNotDeployed => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ConnectionState {
    Loading,
    Ready(ReadyConnection),
    Failed(FailureReason),
}

impl ConnectionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ConnectionState::Loading)
    }

    pub fn ready(&self) -> Option<&ReadyConnection> {
        match self {
            ConnectionState::Ready(ready) => Some(ready),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        match self {
            ConnectionState::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Loading => "loading",
            ConnectionState::Ready(_) => "ready",
            ConnectionState::Failed(_) => "failed",
        }
    }
}

/// A state transition tagged with the request that produced it.
#[derive(Debug, Clone)]
pub struct ConnectionUpdate {
    pub request: RequestId,
    pub state: ConnectionState,
}

/// Reducer over [`ConnectionUpdate`]s. Updates from a request older than the
/// current one are dropped; accepted updates replace the state wholesale.
#[derive(Debug)]
pub struct ConnectionStore {
    current: Option<RequestId>,
    state: ConnectionState,
}

impl ConnectionStore {
    pub fn new() -> Self {
        Self {
            current: None,
            state: ConnectionState::Loading,
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn current_request(&self) -> Option<RequestId> {
        self.current
    }

    /// Returns whether the update was accepted.
    pub fn apply(&mut self, update: ConnectionUpdate) -> bool {
        if self.current.is_some_and(|current| update.request < current) {
            return false;
        }
        self.current = Some(update.request);
        self.state = update.state;
        true
    }
}
