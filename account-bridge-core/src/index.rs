//! Mapping between local account names and provider sub-services.

use std::collections::HashMap;
use std::sync::Arc;

use account_bridge_provider::{AccountId, AccountService};

/// The reconciled mapping table.
///
/// `bound` holds at most one sub-service per local name. `pending` holds
/// sub-services that have been observed but not yet named; membership is
/// what keeps their handles alive, so entries own their `Arc`. A handle
/// dropped from both collections is released for good.
#[derive(Default)]
pub(crate) struct ServiceIndex {
    bound: HashMap<String, Arc<dyn AccountService>>,
    pending: Vec<Arc<dyn AccountService>>,
}

impl ServiceIndex {
    /// Insert `service` under `name` iff the name is free.
    ///
    /// Deterministic naming means a collision cannot happen for distinct
    /// sub-services; rejection here is defensive, not a code path.
    pub(crate) fn try_bind(&mut self, name: &str, service: Arc<dyn AccountService>) -> bool {
        if self.bound.contains_key(name) {
            return false;
        }
        self.bound.insert(name.to_string(), service);
        true
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<Arc<dyn AccountService>> {
        self.bound.get(name).cloned()
    }

    pub(crate) fn names(&self) -> Vec<String> {
        self.bound.keys().cloned().collect()
    }

    pub(crate) fn services(&self) -> Vec<Arc<dyn AccountService>> {
        self.bound.values().cloned().collect()
    }

    /// Remove every bound entry whose sub-service belongs to `id`.
    ///
    /// Returns the removed names; the caller emits one deletion event
    /// per name once the index is consistent again.
    pub(crate) fn remove_account(&mut self, id: AccountId) -> Vec<String> {
        let names: Vec<String> = self
            .bound
            .iter()
            .filter(|(_, service)| service.account().id() == id)
            .map(|(name, _)| name.clone())
            .collect();
        for name in &names {
            self.bound.remove(name);
        }
        names
    }

    /// Take ownership of an observed-but-unnamed sub-service.
    pub(crate) fn push_pending(&mut self, service: Arc<dyn AccountService>) {
        self.pending.push(service);
    }

    /// Release one pending entry by handle identity, if present.
    pub(crate) fn release_pending(&mut self, service: &Arc<dyn AccountService>) -> bool {
        match self
            .pending
            .iter()
            .position(|pending| Arc::ptr_eq(pending, service))
        {
            Some(position) => {
                self.pending.remove(position);
                true
            }
            None => false,
        }
    }

    /// Release every pending entry belonging to `id`. An account may
    /// have produced more than one pending sub-service.
    pub(crate) fn drop_pending_for(&mut self, id: AccountId) {
        self.pending
            .retain(|service| service.account().id() != id);
    }

    #[cfg(test)]
    pub(crate) fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
