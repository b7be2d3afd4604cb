//! Acquisition of a validated contract handle for a target address.
//!
//! Every acquisition is tagged with a [`RequestId`]. Only the most recent
//! request may publish a final state; anything older resolving late is
//! discarded, both here and again in [`ConnectionStore`].

pub mod state;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::data::artifact::{ContractArtifact, ContractHandle};
use crate::data::provider::{ProviderAccessor, parse_address};

pub use state::{
    ConnectionRequest, ConnectionState, ConnectionStore, ConnectionUpdate, FailureReason,
    ReadyConnection, RequestId,
};

/// Called once per successful acquisition that is still the latest when it
/// completes. A `begin` racing with completion can still supersede the id
/// after the call, so receivers compare it with the current request.
pub type LoadedHook = Arc<dyn Fn(RequestId) + Send + Sync>;

#[derive(Clone)]
pub struct ConnectionManager {
    accessor: Arc<dyn ProviderAccessor>,
    probe_timeout: Duration,
    latest: Arc<AtomicU64>,
    updates: mpsc::UnboundedSender<ConnectionUpdate>,
    on_loaded: Option<LoadedHook>,
}

impl ConnectionManager {
    pub fn new(
        accessor: Arc<dyn ProviderAccessor>,
        probe_timeout: Duration,
        updates: mpsc::UnboundedSender<ConnectionUpdate>,
    ) -> Self {
        Self {
            accessor,
            probe_timeout,
            latest: Arc::new(AtomicU64::new(0)),
            updates,
            on_loaded: None,
        }
    }

    pub fn with_on_loaded(mut self, hook: LoadedHook) -> Self {
        self.on_loaded = Some(hook);
        self
    }

    /// Allocate a new request identity and publish `Loading` for it. Any
    /// request still in flight becomes stale from this point on.
    pub fn begin(&self) -> RequestId {
        let id = RequestId(self.latest.fetch_add(1, Ordering::SeqCst) + 1);
        debug!(request = %id, "acquisition started");
        self.emit(id, ConnectionState::Loading);
        id
    }

    pub fn is_current(&self, id: RequestId) -> bool {
        self.latest.load(Ordering::SeqCst) == id.0
    }

    /// Run a full acquisition for `request` and return its outcome.
    pub async fn acquire(&self, request: &ConnectionRequest) -> ConnectionState {
        let id = self.begin();
        self.complete(id, request).await
    }

    /// Start an acquisition on the runtime. `Loading` is published before
    /// this returns.
    pub fn spawn_acquire(&self, request: ConnectionRequest) -> RequestId {
        let id = self.begin();
        let manager = self.clone();
        tokio::spawn(async move {
            manager.complete(id, &request).await;
        });
        id
    }

    async fn complete(&self, id: RequestId, request: &ConnectionRequest) -> ConnectionState {
        let state = match self.resolve(request).await {
            Ok(ready) => ConnectionState::Ready(ready),
            Err(reason) => ConnectionState::Failed(reason),
        };

        if !self.is_current(id) {
            debug!(
                request = %id,
                outcome = state.label(),
                "discarding outcome of superseded acquisition"
            );
            return state;
        }

        match &state {
            ConnectionState::Ready(_) => {
                info!(request = %id, address = %request.address, "contract loaded");
                // A `begin` may have landed since the check above.
                if let Some(hook) = self.on_loaded.as_ref().filter(|_| self.is_current(id)) {
                    hook(id);
                }
            }
            ConnectionState::Failed(reason) => {
                warn!(request = %id, address = %request.address, %reason, "acquisition failed");
            }
            ConnectionState::Loading => {}
        }

        self.emit(id, state.clone());
        state
    }

    async fn resolve(&self, request: &ConnectionRequest) -> Result<ReadyConnection, FailureReason> {
        let provider = self
            .accessor
            .get_provider()
            .map_err(|e| FailureReason::ProviderUnreachable(e.to_string()))?;

        match tokio::time::timeout(self.probe_timeout, provider.is_listening()).await {
            Ok(Ok(true)) => {}
            Ok(Ok(false)) => {
                return Err(FailureReason::ProviderUnreachable(
                    "node is not listening".to_string(),
                ));
            }
            Ok(Err(e)) => return Err(FailureReason::ProviderUnreachable(e.to_string())),
            Err(_) => {
                return Err(FailureReason::ProviderUnreachable(format!(
                    "liveness probe timed out after {:?}",
                    self.probe_timeout
                )));
            }
        }

        // Format check strictly before any code lookup.
        if !provider.is_valid_address(&request.address) {
            return Err(FailureReason::InvalidAddress);
        }
        let address = parse_address(&request.address).ok_or(FailureReason::InvalidAddress)?;

        let contract = ContractHandle::new(request.artifact.abi.clone(), address);

        let code = provider
            .get_code(address)
            .await
            .map_err(|e| FailureReason::Unexpected(e.to_string()))?;
        if code.is_empty() {
            return Err(FailureReason::ContractNotDeployed);
        }

        Ok(ReadyConnection {
            provider,
            contract: Arc::new(contract),
        })
    }

    fn emit(&self, request: RequestId, state: ConnectionState) {
        // A closed channel means the component was dropped; nothing left to notify.
        let _ = self.updates.send(ConnectionUpdate { request, state });
    }
}

/// The component-level state machine: current target, latest state, and
/// the manager that acquires it.
pub struct ConnectionSession {
    manager: ConnectionManager,
    request: ConnectionRequest,
    store: ConnectionStore,
}

impl ConnectionSession {
    pub fn new(manager: ConnectionManager, request: ConnectionRequest) -> Self {
        Self {
            manager,
            request,
            store: ConnectionStore::new(),
        }
    }

    /// Start the initial acquisition.
    pub fn mount(&mut self) -> RequestId {
        self.start()
    }

    /// Replace the target. Only an address change re-acquires; a new artifact
    /// alone is kept for the next acquisition.
    pub fn update_target(
        &mut self,
        address: String,
        artifact: Arc<ContractArtifact>,
    ) -> Option<RequestId> {
        let address_changed = address != self.request.address;
        self.request = ConnectionRequest { address, artifact };
        if !address_changed {
            return None;
        }
        Some(self.start())
    }

    pub fn set_address(&mut self, address: String) -> Option<RequestId> {
        let artifact = Arc::clone(&self.request.artifact);
        self.update_target(address, artifact)
    }

    /// Fold an update from the channel into the state. Returns whether it was accepted.
    pub fn apply(&mut self, update: ConnectionUpdate) -> bool {
        let request = update.request;
        let accepted = self.store.apply(update);
        if !accepted {
            debug!(request = %request, "dropped stale connection update");
        }
        accepted
    }

    pub fn state(&self) -> &ConnectionState {
        self.store.state()
    }

    pub fn request(&self) -> &ConnectionRequest {
        &self.request
    }

    pub fn current_request(&self) -> Option<RequestId> {
        self.store.current_request()
    }

    fn start(&mut self) -> RequestId {
        let id = self.manager.spawn_acquire(self.request.clone());
        // Clear the previous outcome now rather than when the channel catches up.
        self.store.apply(ConnectionUpdate {
            request: id,
            state: ConnectionState::Loading,
        });
        id
    }
}
