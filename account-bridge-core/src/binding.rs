//! Local-name derivation and the binding continuation.

use std::sync::Arc;

use account_bridge_provider::{AccountId, AccountService, ProviderAccount};

use crate::escape::escape_as_identifier;

/// State carried through an asynchronous credential lookup.
///
/// Owning handles for both the target sub-service and its account, so
/// the completion path can finish — or deliberately abandon — the
/// binding even after the provider registry has forgotten the account.
pub(crate) struct BindRequest {
    pub(crate) account: Arc<dyn ProviderAccount>,
    pub(crate) service: Arc<dyn AccountService>,
}

/// Derive the local account name for a provider sub-service.
///
/// The name is `{manager}/{protocol}/{service}_{id}` with the manager
/// and service names identifier-escaped and dashes in the protocol name
/// replaced by underscores. This matches the generic naming scheme the
/// local manager uses for accounts it mints itself, so names from this
/// backend and from other storage backends share one namespace without
/// collisions. Pure: the same inputs always produce the same name.
#[must_use]
pub fn derive_local_name(manager: &str, protocol: &str, service: &str, id: AccountId) -> String {
    format!(
        "{}/{}/{}_{}",
        escape_as_identifier(manager),
        protocol.replace('-', "_"),
        escape_as_identifier(service),
        id
    )
}
