//! [`AccountStorage`] implementation for [`AccountBridge`].
//!
//! The only surface the local manager calls directly. Reads consult the
//! service registry index and decode through the settings codec; the
//! synthetic keys are recomputed from live provider state on every call,
//! never cached.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;

use account_bridge_provider::{AccountId, AccountService};

use crate::bridge::AccountBridge;
use crate::codec;
use crate::storage::{
    AccountInfo, AccountStorage, LocalManager, StorageDescriptor, StorageRestrictions,
    ATTR_DISPLAY_NAME, ATTR_ENABLED, ATTR_ICON, ATTR_SERVICE,
};

/// Short backend name.
pub const STORAGE_NAME: &str = "sso";
/// Human-readable backend description.
pub const STORAGE_DESCRIPTION: &str =
    "Messaging accounts mirrored from the platform SSO account registry";
/// Provider identifier exposed to manager clients.
pub const STORAGE_PROVIDER: &str = "org.accountbridge.Storage.Sso";
/// Above the keyring-backed storage, so registry-owned accounts win.
pub const STORAGE_PRIORITY: i32 = 30;

pub(crate) fn descriptor() -> StorageDescriptor {
    StorageDescriptor {
        name: STORAGE_NAME,
        description: STORAGE_DESCRIPTION,
        provider: STORAGE_PROVIDER,
        priority: STORAGE_PRIORITY,
    }
}

/// Map a provider machine name to the public well-known service
/// identifier where the two differ.
fn public_service_name(provider_name: &str) -> &str {
    match provider_name {
        "google" => "google-talk",
        other => other,
    }
}

impl AccountBridge {
    async fn lookup(&self, account: &str) -> Option<Arc<dyn AccountService>> {
        self.state.read().await.index.lookup(account)
    }
}

#[async_trait]
impl AccountStorage for AccountBridge {
    fn descriptor(&self) -> &StorageDescriptor {
        self.descriptor_ref()
    }

    async fn list(&self) -> Vec<String> {
        self.ensure_loaded().await;
        self.state.read().await.index.names()
    }

    async fn get(&self, manager: &dyn LocalManager, account: &str, key: Option<&str>) -> bool {
        let Some(service) = self.lookup(account).await else {
            return false;
        };
        let provider_account = service.account();
        let mut handled = false;

        if key.is_none() {
            for (setting_key, value) in codec::read_all(service.as_ref()) {
                manager.set_value(account, &setting_key, Some(&value));
            }
        }

        // Synthetic keys, recomputed from live provider state.
        if matches!(key, None | Some(ATTR_ENABLED)) {
            let enabled = if service.enabled() { "true" } else { "false" };
            manager.set_value(account, ATTR_ENABLED, Some(enabled));
            handled = true;
        }

        if matches!(key, None | Some(ATTR_DISPLAY_NAME)) {
            manager.set_value(account, ATTR_DISPLAY_NAME, Some(&provider_account.display_name()));
            handled = true;
        }

        if matches!(key, None | Some(ATTR_SERVICE)) {
            let service_name = provider_account.provider_name();
            manager.set_value(account, ATTR_SERVICE, Some(public_service_name(&service_name)));
            handled = true;
        }

        if matches!(key, None | Some(ATTR_ICON)) {
            let mut icon = service.icon_name();
            if icon.is_empty() {
                icon = self
                    .directory()
                    .provider(&provider_account.provider_name())
                    .map(|info| info.icon_name)
                    .unwrap_or_default();
            }
            manager.set_value(account, ATTR_ICON, Some(&icon));
            handled = true;
        }

        // None of the synthetic keys: a plain namespaced setting.
        if !handled {
            if let Some(key) = key {
                let value = codec::read(service.as_ref(), key);
                manager.set_value(account, key, value.as_deref());
            }
        }

        true
    }

    async fn set(&self, account: &str, key: &str, value: &str) -> bool {
        let Some(service) = self.lookup(account).await else {
            return false;
        };
        let provider_account = service.account();

        match key {
            // Enabled is account-global in the provider registry, not
            // per sub-service.
            ATTR_ENABLED => provider_account.set_enabled(value == "true"),
            ATTR_DISPLAY_NAME => provider_account.set_display_name(value),
            _ => codec::write(service.as_ref(), key, Some(value)),
        }

        true
    }

    async fn create(
        &self,
        manager_name: &str,
        protocol: &str,
        _parameters: &HashMap<String, String>,
    ) -> Option<String> {
        // Accounts originate in the provider registry, never here.
        log::debug!("refusing to create {manager_name}/{protocol} account");
        None
    }

    async fn delete(&self, account: &str, _key: Option<&str>) -> bool {
        // Deletion belongs to the provider registry, never to us.
        log::debug!("refusing to delete account {account}");
        false
    }

    async fn commit(&self) -> bool {
        let services = self.state.read().await.index.services();

        // Several bound services can share one provider account; store
        // each account once.
        let mut seen = HashSet::new();
        let mut accounts = Vec::new();
        for service in services {
            let provider_account = service.account();
            if seen.insert(provider_account.id()) {
                accounts.push(provider_account);
            }
        }

        futures::future::join_all(
            accounts
                .iter()
                .map(|provider_account| self.store_account(provider_account)),
        )
        .await;

        true
    }

    async fn ready(&self, manager: Arc<dyn LocalManager>) {
        self.mark_ready(manager).await;
    }

    async fn identifier(&self, account: &str) -> Option<AccountId> {
        let service = self.lookup(account).await?;
        Some(service.account().id())
    }

    async fn additional_info(&self, account: &str) -> Option<AccountInfo> {
        let service = self.lookup(account).await?;
        let provider_account = service.account();
        let provider_name = provider_account.provider_name();
        let provider_display_name = self
            .directory()
            .provider(&provider_name)
            .map_or(provider_name, |info| info.display_name);

        Some(AccountInfo {
            provider_display_name,
            account_display_name: provider_account.display_name(),
        })
    }

    async fn restrictions(&self, account: &str) -> StorageRestrictions {
        let Some(service) = self.lookup(account).await else {
            return StorageRestrictions::all();
        };

        StorageRestrictions {
            cannot_set_service: true,
            cannot_set_parameters: codec::read_flag(service.as_ref(), codec::KEY_READONLY_PARAMS),
            ..StorageRestrictions::default()
        }
    }
}
