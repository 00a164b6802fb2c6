use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{AccountId, AuthData, ProviderInfo, SettingValue};

/// A provider account as seen through the registry.
///
/// Lifecycle is controlled entirely by the external registry; the bridge
/// only observes creation/deletion and edits account-global properties.
/// `store` is the single asynchronous persistence entry point: settings
/// and property writes are staged in memory until it is called.
#[async_trait]
pub trait ProviderAccount: Send + Sync {
    /// Registry-allocated account id.
    fn id(&self) -> AccountId;

    /// Account-global enabled flag.
    fn enabled(&self) -> bool;

    /// Set the account-global enabled flag.
    fn set_enabled(&self, enabled: bool);

    /// Human-readable account name, e.g. the user's email address.
    fn display_name(&self) -> String;

    /// Replace the human-readable account name.
    fn set_display_name(&self, name: &str);

    /// Machine name of the provider this account belongs to.
    fn provider_name(&self) -> String;

    /// Persist staged changes back into the registry.
    async fn store(&self) -> Result<()>;
}

/// A provider account scoped to one service class.
///
/// This is the unit the bridge binds to a local account name. Settings
/// reads and writes are staged against the owning account and persisted
/// by [`ProviderAccount::store`].
pub trait AccountService: Send + Sync {
    /// Handle to the owning account.
    fn account(&self) -> Arc<dyn ProviderAccount>;

    /// Machine name of the service, e.g. `google_im`.
    fn service_name(&self) -> String;

    /// Icon name from the service's metadata; may be empty.
    fn icon_name(&self) -> String;

    /// Effective enabled flag (account-global flag and the service's own
    /// selection combined).
    fn enabled(&self) -> bool;

    /// Read one typed setting by its full key.
    fn value(&self, key: &str) -> Option<SettingValue>;

    /// Write one typed setting, or clear it with `None`.
    fn set_value(&self, key: &str, value: Option<SettingValue>);

    /// Iterate settings under `prefix`.
    ///
    /// Returned keys are relative to the prefix, matching how the
    /// registry scopes settings iterators.
    fn settings_with_prefix(&self, prefix: &str) -> Vec<(String, SettingValue)>;

    /// Authentication data attached to this service, if any.
    fn auth_data(&self) -> Option<AuthData>;
}

/// Read access to the provider registry, scoped to one service class at
/// construction time (only sub-services of that class are ever returned).
///
/// Change notifications are delivered out of band: the embedding runtime
/// routes account-created/account-deleted and per-service enabled/changed
/// events to whoever consumes this directory.
pub trait ProviderDirectory: Send + Sync {
    /// Look up an account by id. `None` once the account is deleted.
    fn account(&self, id: AccountId) -> Option<Arc<dyn ProviderAccount>>;

    /// Sub-services of the directory's service class owned by `id`.
    fn services(&self, id: AccountId) -> Vec<Arc<dyn AccountService>>;

    /// Snapshot of every sub-service of the directory's service class,
    /// across all accounts.
    fn all_services(&self) -> Vec<Arc<dyn AccountService>>;

    /// Static provider metadata by machine name.
    fn provider(&self, name: &str) -> Option<ProviderInfo>;
}

/// Asynchronous credential-store lookups.
///
/// Given a credential handle from [`AuthData`], resolve the identifying
/// name (typically the login user name) recorded with the credential.
#[async_trait]
pub trait CredentialResolver: Send + Sync {
    /// Resolve the identifying name stored for `credentials_id`.
    ///
    /// `Ok(None)` means the credential exists but records no name; an
    /// empty string is treated the same by callers.
    async fn lookup_name(&self, credentials_id: u32) -> Result<Option<String>>;
}
