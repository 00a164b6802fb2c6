//! Shared fixtures for the bridge test suites.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use account_bridge_core::{AccountBridge, AccountStorage, LocalManager};
use account_bridge_provider::memory::{
    MemoryAccount, MemoryCredentialResolver, MemoryDirectory, MemoryService,
};
use account_bridge_provider::{
    AccountId, AccountService, CredentialResolver, ProviderAccount, SettingValue,
};

/// Local name the standard fixture account binds to.
pub const FIXTURE_NAME: &str = "gabble/jabber/google_2dim_1";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============ RecordingManager ============

/// An outbound notification observed by the manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Created(String),
    Deleted(String),
    Altered(String),
    Toggled(String, bool),
}

/// Local-manager double: records every event and reported value.
#[derive(Default)]
pub struct RecordingManager {
    events: Mutex<Vec<Event>>,
    values: Mutex<HashMap<(String, String), Option<String>>>,
}

impl RecordingManager {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<Event> {
        lock(&self.events).clone()
    }

    pub fn created_count(&self, account: &str) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, Event::Created(name) if name == account))
            .count()
    }

    /// Last value reported for `(account, key)`. Outer `None` means the
    /// key was never reported; inner `None` means "reported as unset".
    pub fn value(&self, account: &str, key: &str) -> Option<Option<String>> {
        lock(&self.values)
            .get(&(account.to_string(), key.to_string()))
            .cloned()
    }

    pub fn clear(&self) {
        lock(&self.events).clear();
        lock(&self.values).clear();
    }
}

impl LocalManager for RecordingManager {
    fn set_value(&self, account: &str, key: &str, value: Option<&str>) {
        lock(&self.values).insert(
            (account.to_string(), key.to_string()),
            value.map(String::from),
        );
    }

    fn created(&self, account: &str) {
        lock(&self.events).push(Event::Created(account.to_string()));
    }

    fn deleted(&self, account: &str) {
        lock(&self.events).push(Event::Deleted(account.to_string()));
    }

    fn altered(&self, account: &str) {
        lock(&self.events).push(Event::Altered(account.to_string()));
    }

    fn toggled(&self, account: &str, enabled: bool) {
        lock(&self.events).push(Event::Toggled(account.to_string(), enabled));
    }
}

// ============ VanishingResolver ============

/// Resolver that deletes the target account from the directory before
/// answering, simulating an account deletion racing an in-flight
/// credential lookup.
pub struct VanishingResolver {
    pub directory: MemoryDirectory,
    pub target: AccountId,
}

#[async_trait]
impl CredentialResolver for VanishingResolver {
    async fn lookup_name(
        &self,
        _credentials_id: u32,
    ) -> account_bridge_provider::Result<Option<String>> {
        self.directory.remove_account(self.target);
        Ok(Some("alice@example.com".to_string()))
    }
}

// ============ Fixture ============

/// One bridge over fresh in-memory collaborators.
pub struct Fixture {
    pub directory: MemoryDirectory,
    pub resolver: MemoryCredentialResolver,
    pub manager: Arc<RecordingManager>,
    pub bridge: AccountBridge,
}

impl Fixture {
    pub fn new() -> Self {
        let directory = MemoryDirectory::new();
        let resolver = MemoryCredentialResolver::new();
        let bridge = AccountBridge::new(
            Arc::new(directory.clone()),
            Arc::new(resolver.clone()),
        );
        Self {
            directory,
            resolver,
            manager: RecordingManager::new(),
            bridge,
        }
    }

    /// Manager startup sequence: enumerate, then signal readiness.
    pub async fn boot(&self) {
        let _ = self.bridge.list().await;
        self.ready().await;
    }

    pub async fn ready(&self) {
        self.bridge
            .ready(Arc::clone(&self.manager) as Arc<dyn LocalManager>)
            .await;
    }

    /// A `google` account with one messaging service carrying
    /// manager/protocol metadata. Binds as [`FIXTURE_NAME`].
    pub fn seeded_account(&self, enabled: bool) -> (Arc<MemoryAccount>, Arc<MemoryService>) {
        let account = self.directory.create_account("google", "alice@example.com");
        account.set_enabled(enabled);
        let service = self.directory.add_service(&account, "google-im", "im-google");
        service.set_value(
            "messaging/manager",
            Some(SettingValue::Str("gabble".to_string())),
        );
        service.set_value(
            "messaging/protocol",
            Some(SettingValue::Str("jabber".to_string())),
        );
        (account, service)
    }

    /// Like [`seeded_account`](Self::seeded_account), with the
    /// identifying parameter already cached so binding needs no
    /// credential lookup.
    pub fn seeded_account_with_param(
        &self,
        enabled: bool,
    ) -> (Arc<MemoryAccount>, Arc<MemoryService>) {
        let (account, service) = self.seeded_account(enabled);
        service.set_value(
            "messaging/param-account",
            Some(SettingValue::Str("alice@example.com".to_string())),
        );
        (account, service)
    }
}

/// Coerce a concrete memory service into the handle type the bridge
/// handlers take.
pub fn as_dyn(service: &Arc<MemoryService>) -> Arc<dyn AccountService> {
    Arc::clone(service) as Arc<dyn AccountService>
}
