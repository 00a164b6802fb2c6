//! In-memory provider registry.
//!
//! Default implementation, available on all platforms. Real deployments
//! back [`ProviderDirectory`] with the platform account database; this
//! one lives entirely in process memory and doubles as the test double
//! for everything built on top of the provider traits. Write failures
//! can be injected per account and per resolver to exercise the
//! non-fatal error paths.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::traits::{AccountService, CredentialResolver, ProviderAccount, ProviderDirectory};
use crate::types::{AccountId, AuthData, ProviderInfo, SettingValue};

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

// ============ MemoryAccount ============

struct AccountState {
    enabled: bool,
    display_name: String,
    /// When set, `store()` fails with this message.
    store_error: Option<String>,
    store_count: usize,
}

/// In-memory [`ProviderAccount`].
pub struct MemoryAccount {
    id: AccountId,
    provider_name: String,
    state: RwLock<AccountState>,
}

impl MemoryAccount {
    /// Number of completed `store()` calls, for asserting persistence.
    #[must_use]
    pub fn store_count(&self) -> usize {
        read(&self.state).store_count
    }

    /// Make subsequent `store()` calls fail with `detail`, or succeed
    /// again with `None`.
    pub fn set_store_error(&self, detail: Option<String>) {
        write(&self.state).store_error = detail;
    }
}

#[async_trait]
impl ProviderAccount for MemoryAccount {
    fn id(&self) -> AccountId {
        self.id
    }

    fn enabled(&self) -> bool {
        read(&self.state).enabled
    }

    fn set_enabled(&self, enabled: bool) {
        write(&self.state).enabled = enabled;
    }

    fn display_name(&self) -> String {
        read(&self.state).display_name.clone()
    }

    fn set_display_name(&self, name: &str) {
        write(&self.state).display_name = name.to_string();
    }

    fn provider_name(&self) -> String {
        self.provider_name.clone()
    }

    async fn store(&self) -> Result<()> {
        let mut state = write(&self.state);
        if let Some(detail) = state.store_error.clone() {
            log::debug!("injected store failure for account {}", self.id);
            return Err(ProviderError::StoreFailed {
                account_id: self.id,
                detail,
            });
        }
        state.store_count += 1;
        Ok(())
    }
}

// ============ MemoryService ============

struct ServiceState {
    selected: bool,
    settings: HashMap<String, SettingValue>,
    auth_data: Option<AuthData>,
}

/// In-memory [`AccountService`].
pub struct MemoryService {
    account: Arc<MemoryAccount>,
    service_name: String,
    icon_name: String,
    state: RwLock<ServiceState>,
}

impl MemoryService {
    /// Set the service's own selection flag. The effective enabled flag
    /// is this combined with the account-global flag.
    pub fn set_selected(&self, selected: bool) {
        write(&self.state).selected = selected;
    }

    /// Attach (or detach) authentication data.
    pub fn set_auth_data(&self, auth_data: Option<AuthData>) {
        write(&self.state).auth_data = auth_data;
    }
}

impl AccountService for MemoryService {
    fn account(&self) -> Arc<dyn ProviderAccount> {
        Arc::clone(&self.account) as Arc<dyn ProviderAccount>
    }

    fn service_name(&self) -> String {
        self.service_name.clone()
    }

    fn icon_name(&self) -> String {
        self.icon_name.clone()
    }

    fn enabled(&self) -> bool {
        self.account.enabled() && read(&self.state).selected
    }

    fn value(&self, key: &str) -> Option<SettingValue> {
        read(&self.state).settings.get(key).cloned()
    }

    fn set_value(&self, key: &str, value: Option<SettingValue>) {
        let mut state = write(&self.state);
        match value {
            Some(value) => {
                state.settings.insert(key.to_string(), value);
            }
            None => {
                state.settings.remove(key);
            }
        }
    }

    fn settings_with_prefix(&self, prefix: &str) -> Vec<(String, SettingValue)> {
        read(&self.state)
            .settings
            .iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(prefix)
                    .map(|rest| (rest.to_string(), value.clone()))
            })
            .collect()
    }

    fn auth_data(&self) -> Option<AuthData> {
        read(&self.state).auth_data
    }
}

// ============ MemoryDirectory ============

#[derive(Default)]
struct DirectoryState {
    next_id: u32,
    accounts: HashMap<AccountId, Arc<MemoryAccount>>,
    services: Vec<Arc<MemoryService>>,
    providers: HashMap<String, ProviderInfo>,
}

/// In-memory [`ProviderDirectory`].
///
/// Accounts and services registered here are returned by the trait
/// methods until [`remove_account`](Self::remove_account) is called.
/// Removal only affects the directory; handles already held elsewhere
/// stay alive, which is exactly the situation an in-flight credential
/// lookup has to survive.
#[derive(Clone, Default)]
pub struct MemoryDirectory {
    state: Arc<RwLock<DirectoryState>>,
}

impl MemoryDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register static provider metadata.
    pub fn add_provider(&self, info: ProviderInfo) {
        write(&self.state).providers.insert(info.name.clone(), info);
    }

    /// Create a new account under `provider_name` with a fresh id.
    pub fn create_account(&self, provider_name: &str, display_name: &str) -> Arc<MemoryAccount> {
        let mut state = write(&self.state);
        state.next_id += 1;
        let account = Arc::new(MemoryAccount {
            id: AccountId(state.next_id),
            provider_name: provider_name.to_string(),
            state: RwLock::new(AccountState {
                enabled: false,
                display_name: display_name.to_string(),
                store_error: None,
                store_count: 0,
            }),
        });
        state.accounts.insert(account.id, Arc::clone(&account));
        account
    }

    /// Attach a sub-service to an existing account.
    pub fn add_service(
        &self,
        account: &Arc<MemoryAccount>,
        service_name: &str,
        icon_name: &str,
    ) -> Arc<MemoryService> {
        let service = Arc::new(MemoryService {
            account: Arc::clone(account),
            service_name: service_name.to_string(),
            icon_name: icon_name.to_string(),
            state: RwLock::new(ServiceState {
                selected: true,
                settings: HashMap::new(),
                auth_data: None,
            }),
        });
        write(&self.state).services.push(Arc::clone(&service));
        service
    }

    /// Drop an account and its services from the directory.
    ///
    /// The caller is responsible for delivering the matching deletion
    /// notification to directory consumers.
    pub fn remove_account(&self, id: AccountId) {
        let mut state = write(&self.state);
        state.accounts.remove(&id);
        state.services.retain(|service| service.account.id != id);
    }
}

impl ProviderDirectory for MemoryDirectory {
    fn account(&self, id: AccountId) -> Option<Arc<dyn ProviderAccount>> {
        read(&self.state)
            .accounts
            .get(&id)
            .map(|account| Arc::clone(account) as Arc<dyn ProviderAccount>)
    }

    fn services(&self, id: AccountId) -> Vec<Arc<dyn AccountService>> {
        read(&self.state)
            .services
            .iter()
            .filter(|service| service.account.id == id)
            .map(|service| Arc::clone(service) as Arc<dyn AccountService>)
            .collect()
    }

    fn all_services(&self) -> Vec<Arc<dyn AccountService>> {
        read(&self.state)
            .services
            .iter()
            .map(|service| Arc::clone(service) as Arc<dyn AccountService>)
            .collect()
    }

    fn provider(&self, name: &str) -> Option<ProviderInfo> {
        read(&self.state).providers.get(name).cloned()
    }
}

// ============ MemoryCredentialResolver ============

#[derive(Default)]
struct ResolverState {
    names: HashMap<u32, String>,
    /// When set, every lookup fails with this message.
    query_error: Option<String>,
}

/// In-memory [`CredentialResolver`].
///
/// Unregistered credential ids resolve to [`ProviderError::IdentityNotFound`],
/// mirroring a credential store that cannot materialize the identity.
#[derive(Clone, Default)]
pub struct MemoryCredentialResolver {
    state: Arc<RwLock<ResolverState>>,
}

impl MemoryCredentialResolver {
    /// Create an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the identifying name for a credential id. An empty string
    /// is a valid record and models a credential with no user name.
    pub fn insert(&self, credentials_id: u32, name: &str) {
        write(&self.state)
            .names
            .insert(credentials_id, name.to_string());
    }

    /// Make every lookup fail with `detail`, or succeed again with `None`.
    pub fn set_query_error(&self, detail: Option<String>) {
        write(&self.state).query_error = detail;
    }
}

#[async_trait]
impl CredentialResolver for MemoryCredentialResolver {
    async fn lookup_name(&self, credentials_id: u32) -> Result<Option<String>> {
        let state = read(&self.state);
        if let Some(detail) = state.query_error.clone() {
            log::debug!("injected query failure for credential {credentials_id}");
            return Err(ProviderError::QueryFailed { detail });
        }
        match state.names.get(&credentials_id) {
            Some(name) => Ok(Some(name.clone())),
            None => Err(ProviderError::IdentityNotFound { credentials_id }),
        }
    }
}
