//! The synchronization state machine.
//!
//! [`AccountBridge`] owns the reconciled mapping between provider
//! sub-services and local account names. Provider notifications enter
//! through the `account_created` / `account_deleted` /
//! `service_enabled` / `service_changed` handlers; the storage side of
//! the same struct lives in the adapter module.
//!
//! Until the local manager signals readiness, creation/deletion
//! notifications are parked in the deferred queue and replayed — in
//! arrival order, through these same handlers — by the readiness
//! transition. Handlers mutate the index first and emit events after
//! releasing the state lock, because an event may synchronously trigger
//! a manager call that reads the index back.

use std::sync::Arc;

use tokio::sync::RwLock;

use account_bridge_provider::{
    AccountId, AccountService, CredentialResolver, ProviderAccount, ProviderDirectory,
};

use crate::binding::{derive_local_name, BindRequest};
use crate::codec;
use crate::error::{CoreError, CoreResult};
use crate::index::ServiceIndex;
use crate::queue::{DeferredEvent, DeferredQueue};
use crate::storage::{LocalManager, StorageDescriptor};

pub(crate) struct BridgeState {
    pub(crate) index: ServiceIndex,
    /// `Some` until the readiness transition drains it; single-use.
    deferred: Option<DeferredQueue>,
    /// Retained by `ready()` for emitting events from then on.
    manager: Option<Arc<dyn LocalManager>>,
    loaded: bool,
    ready: bool,
}

/// Bridges the SSO provider registry into the messaging-account manager.
///
/// One instance per process, constructed at backend registration and
/// alive until disposal. All entry points are driven by the embedding
/// single-threaded runtime; the internal lock is never held across an
/// `await` that leaves the crate.
pub struct AccountBridge {
    directory: Arc<dyn ProviderDirectory>,
    resolver: Arc<dyn CredentialResolver>,
    descriptor: StorageDescriptor,
    pub(crate) state: RwLock<BridgeState>,
}

impl AccountBridge {
    /// Create a bridge over `directory`, resolving credentials through
    /// `resolver`.
    #[must_use]
    pub fn new(directory: Arc<dyn ProviderDirectory>, resolver: Arc<dyn CredentialResolver>) -> Self {
        Self {
            directory,
            resolver,
            descriptor: crate::adapter::descriptor(),
            state: RwLock::new(BridgeState {
                index: ServiceIndex::default(),
                deferred: Some(DeferredQueue::default()),
                manager: None,
                loaded: false,
                ready: false,
            }),
        }
    }

    pub(crate) fn directory(&self) -> &Arc<dyn ProviderDirectory> {
        &self.directory
    }

    pub(crate) fn descriptor_ref(&self) -> &StorageDescriptor {
        &self.descriptor
    }

    pub(crate) async fn manager(&self) -> Option<Arc<dyn LocalManager>> {
        self.state.read().await.manager.clone()
    }

    // ============ Provider notification handlers ============

    /// A provider account appeared (or is being replayed from the
    /// deferred queue).
    pub async fn account_created(&self, id: AccountId) {
        if self.defer_if_not_ready(DeferredEvent::Created(id)).await {
            return;
        }

        let Some(account) = self.directory.account(id) else {
            log::debug!("created notification for unknown account {id}; ignoring");
            return;
        };

        let enabled = account.enabled();
        for service in self.directory.services(id) {
            if enabled {
                if let Err(e) = self.bind_service(&service).await {
                    log_bind_outcome(id, &e);
                }
            } else {
                // Not enabled yet; hold a reference so the service stays
                // observable until its enable notification arrives.
                self.state.write().await.index.push_pending(service);
            }
        }
    }

    /// A provider account was deleted (or is being replayed).
    pub async fn account_deleted(&self, id: AccountId) {
        if self.defer_if_not_ready(DeferredEvent::Deleted(id)).await {
            return;
        }

        let removed = {
            let mut state = self.state.write().await;
            let removed = state.index.remove_account(id);
            // Pending entries were never exposed: release them without
            // an event.
            state.index.drop_pending_for(id);
            removed
        };

        if removed.is_empty() {
            return;
        }
        let Some(manager) = self.manager().await else {
            return;
        };
        for name in &removed {
            log::debug!("account {name} deleted");
            manager.deleted(name);
        }
    }

    /// The effective enabled flag of a sub-service flipped.
    pub async fn service_enabled(&self, service: &Arc<dyn AccountService>, enabled: bool) {
        match codec::read(service.as_ref(), codec::KEY_LOCAL_NAME) {
            Some(name) => {
                // Steady state: the binding exists, relay the flip.
                log::debug!(
                    "account {name} toggled: {}",
                    if enabled { "enabled" } else { "disabled" }
                );
                if let Some(manager) = self.manager().await {
                    manager.toggled(&name, enabled);
                }
            }
            None if enabled => {
                // Binding now would index the account with no manager
                // attached, so nobody would ever be told it exists. The
                // deferred creation replay binds it at readiness.
                if !self.state.read().await.ready {
                    return;
                }
                let account_id = service.account().id();
                if let Err(e) = self.bind_service(service).await {
                    log_bind_outcome(account_id, &e);
                }
                self.state.write().await.index.release_pending(service);
            }
            None => {}
        }
    }

    /// Some settings of a sub-service changed.
    pub async fn service_changed(&self, service: &Arc<dyn AccountService>) {
        if !self.state.read().await.ready {
            return;
        }
        let Some(name) = codec::read(service.as_ref(), codec::KEY_LOCAL_NAME) else {
            return;
        };
        log::debug!("account {name} changed");
        if let Some(manager) = self.manager().await {
            manager.altered(&name);
        }
    }

    /// Park `event` when the manager is not ready yet. Returns whether
    /// it was parked.
    async fn defer_if_not_ready(&self, event: DeferredEvent) -> bool {
        let mut state = self.state.write().await;
        if state.ready {
            return false;
        }
        if let Some(queue) = state.deferred.as_mut() {
            queue.push(event);
        }
        true
    }

    // ============ Binding protocol ============

    /// Attempt to bind `service` to a local account name.
    ///
    /// Already-named services are re-indexed directly. Otherwise the
    /// name is derived from the service's own metadata, which may first
    /// require resolving the identifying value through the credential
    /// store. Every `Err` is an abandoned attempt, not a state change:
    /// a later enable notification may retry.
    async fn bind_service(&self, service: &Arc<dyn AccountService>) -> CoreResult<()> {
        if let Some(name) = codec::read(service.as_ref(), codec::KEY_LOCAL_NAME) {
            self.index_bound(service, name).await;
            return Ok(());
        }

        if codec::read(service.as_ref(), codec::KEY_ACCOUNT_PARAM).is_some() {
            return self.derive_and_bind(service).await;
        }

        // The identifying value is not cached; it only exists in the
        // credential store.
        let account = service.account();
        let account_id = account.id();
        let auth_data = service
            .auth_data()
            .ok_or(CoreError::MissingAuthData { account_id })?;

        let request = BindRequest {
            account,
            service: Arc::clone(service),
        };

        log::debug!("querying credential {} for account {account_id}", auth_data.credentials_id);
        let resolved = self.resolver.lookup_name(auth_data.credentials_id).await?;
        let identifying = resolved
            .filter(|name| !name.is_empty())
            .ok_or(CoreError::EmptyCredentialName {
                credentials_id: auth_data.credentials_id,
            })?;

        // The lookup yielded to the dispatch loop; the account may have
        // been deleted meanwhile. The handles in `request` are still
        // alive, but acting on them would resurrect a dead account.
        if self.directory.account(request.account.id()).is_none() {
            return Err(CoreError::AccountVanished { account_id });
        }

        codec::write(
            request.service.as_ref(),
            codec::KEY_ACCOUNT_PARAM,
            Some(&identifying),
        );
        self.store_account(&request.account).await;
        self.derive_and_bind(&request.service).await
    }

    /// Derive the local name, persist the binding, and index it.
    async fn derive_and_bind(&self, service: &Arc<dyn AccountService>) -> CoreResult<()> {
        let account = service.account();
        let manager_name = codec::read(service.as_ref(), codec::KEY_MANAGER)
            .filter(|value| !value.is_empty());
        let protocol = codec::read(service.as_ref(), codec::KEY_PROTOCOL)
            .filter(|value| !value.is_empty());
        let (Some(manager_name), Some(protocol)) = (manager_name, protocol) else {
            return Err(CoreError::MissingMetadata {
                account_id: account.id(),
            });
        };

        let name = derive_local_name(
            &manager_name,
            &protocol,
            &service.service_name(),
            account.id(),
        );

        codec::write(service.as_ref(), codec::KEY_LOCAL_NAME, Some(&name));
        self.store_account(&account).await;
        log::debug!("bound account {} as {name}", account.id());

        self.index_bound(service, name).await;
        Ok(())
    }

    /// Insert a named service into the index and announce it.
    async fn index_bound(&self, service: &Arc<dyn AccountService>, name: String) {
        let inserted = {
            let mut state = self.state.write().await;
            state.index.try_bind(&name, Arc::clone(service))
        };
        if !inserted {
            log::debug!("account {name} already present; ignoring");
            return;
        }
        if let Some(manager) = self.manager().await {
            manager.created(&name);
        }
    }

    /// Persist `account`; failure is logged and otherwise ignored. The
    /// next commit (or binding attempt) is the natural retry.
    pub(crate) async fn store_account(&self, account: &Arc<dyn ProviderAccount>) {
        if let Err(e) = account.store().await {
            log::warn!("failed to store account '{}': {e}", account.display_name());
        }
    }

    // ============ Startup ============

    /// One-time enumeration of the current provider snapshot.
    ///
    /// Services named during an earlier run are indexed silently; ones
    /// never seen by the manager are parked as deferred creations so
    /// they run through the normal binding path once it is ready.
    pub(crate) async fn ensure_loaded(&self) {
        let mut state = self.state.write().await;
        if state.loaded {
            return;
        }
        state.loaded = true;
        // Enumerating after readiness would find the deferred queue
        // already drained and silently drop every unnamed service.
        assert!(!state.ready, "the first list() must precede ready()");

        for service in self.directory.all_services() {
            if let Some(name) = codec::read(service.as_ref(), codec::KEY_LOCAL_NAME) {
                state.index.try_bind(&name, service);
            } else if let Some(queue) = state.deferred.as_mut() {
                queue.push(DeferredEvent::Created(service.account().id()));
            }
        }
    }

    /// The readiness transition: retain the manager, then drain the
    /// deferred queue through the live handlers, exactly once.
    pub(crate) async fn mark_ready(&self, manager: Arc<dyn LocalManager>) {
        let drained = {
            let mut state = self.state.write().await;
            if state.ready {
                return;
            }
            state.ready = true;
            state.manager = Some(manager);
            state.deferred.take()
        };

        let Some(mut queue) = drained else {
            return;
        };
        while let Some(event) = queue.pop() {
            match event {
                DeferredEvent::Created(id) => self.account_created(id).await,
                DeferredEvent::Deleted(id) => self.account_deleted(id).await,
            }
        }
    }
}

fn log_bind_outcome(id: AccountId, error: &CoreError) {
    if error.is_expected() {
        log::debug!("not binding account {id}: {error}");
    } else {
        log::warn!("binding account {id} failed: {error}");
    }
}
