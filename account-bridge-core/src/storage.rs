//! The storage boundary with the local messaging-account manager.
//!
//! [`AccountStorage`] is the method table a storage backend hands to the
//! manager's plugin host at registration time, together with a static
//! [`StorageDescriptor`]. [`LocalManager`] is the opposite direction:
//! the callbacks a backend uses to report values and emit change events.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use account_bridge_provider::AccountId;

/// Synthetic key: effective enabled flag, recomputed from provider state.
pub const ATTR_ENABLED: &str = "Enabled";
/// Synthetic key: account display name.
pub const ATTR_DISPLAY_NAME: &str = "DisplayName";
/// Synthetic key: well-known public service identifier.
pub const ATTR_SERVICE: &str = "Service";
/// Synthetic key: icon name.
pub const ATTR_ICON: &str = "Icon";

/// Static registration metadata for a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageDescriptor {
    /// Short backend name.
    pub name: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// Provider identifier string exposed to manager clients.
    pub provider: &'static str,
    /// Priority relative to other storage backends; higher wins.
    pub priority: i32,
}

/// What the local manager may not change about an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageRestrictions {
    /// The service field is immutable.
    pub cannot_set_service: bool,
    /// Connection parameters are immutable.
    pub cannot_set_parameters: bool,
    /// The enabled flag is immutable.
    pub cannot_set_enabled: bool,
    /// Presence settings are immutable.
    pub cannot_set_presence: bool,
}

impl StorageRestrictions {
    /// Everything restricted; the answer for names this backend does not
    /// know.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            cannot_set_service: true,
            cannot_set_parameters: true,
            cannot_set_enabled: true,
            cannot_set_presence: true,
        }
    }
}

/// Display metadata about the provider side of a bound account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    /// Human-readable provider name, e.g. `Google`.
    pub provider_display_name: String,
    /// Human-readable account name, e.g. the user's address.
    pub account_display_name: String,
}

/// Callbacks into the local messaging-account manager.
///
/// `set_value` reports a single setting during a [`AccountStorage::get`]
/// call; the four event methods are the outbound notifications a backend
/// may emit at any time after [`AccountStorage::ready`]. All calls are
/// synchronous and run on the manager's dispatch loop.
pub trait LocalManager: Send + Sync {
    /// Report one setting of `account`; `None` reports the key as unset.
    fn set_value(&self, account: &str, key: &str, value: Option<&str>);

    /// A new account appeared in this backend.
    fn created(&self, account: &str);

    /// An account disappeared from this backend.
    fn deleted(&self, account: &str);

    /// Some settings of an account changed.
    fn altered(&self, account: &str);

    /// The enabled flag of an account flipped.
    fn toggled(&self, account: &str, enabled: bool);
}

/// The storage backend contract.
///
/// Entry points are invoked by the manager from its single-threaded
/// dispatch loop, never concurrently with each other.
#[async_trait]
pub trait AccountStorage: Send + Sync {
    /// Registration metadata.
    fn descriptor(&self) -> &StorageDescriptor;

    /// Names of every account currently provided by this backend.
    ///
    /// The first call enumerates the provider registry snapshot.
    async fn list(&self) -> Vec<String>;

    /// Report settings of `account` through `manager`.
    ///
    /// With `key = None` every setting is reported, including the
    /// synthetic ones. Returns `false` iff the name is unknown here.
    async fn get(&self, manager: &dyn LocalManager, account: &str, key: Option<&str>) -> bool;

    /// Store one setting. Returns `false` iff the name is unknown here.
    async fn set(&self, account: &str, key: &str, value: &str) -> bool;

    /// Ask this backend to originate a new account. Backends that only
    /// mirror an external registry answer `None`.
    async fn create(
        &self,
        manager_name: &str,
        protocol: &str,
        parameters: &HashMap<String, String>,
    ) -> Option<String>;

    /// Ask this backend to delete an account (or one key of it).
    /// Backends that only mirror an external registry answer `false`.
    async fn delete(&self, account: &str, key: Option<&str>) -> bool;

    /// Persist every account once. Individual failures are logged, not
    /// reported; the next commit is the retry.
    async fn commit(&self) -> bool;

    /// The manager is ready to receive events. Idempotent; the first
    /// call replays notifications deferred during startup.
    async fn ready(&self, manager: Arc<dyn LocalManager>);

    /// Provider-side numeric identifier for a bound name.
    async fn identifier(&self, account: &str) -> Option<AccountId>;

    /// Display metadata for a bound name.
    async fn additional_info(&self, account: &str) -> Option<AccountInfo>;

    /// What the manager may not change about `account`.
    async fn restrictions(&self, account: &str) -> StorageRestrictions;
}
