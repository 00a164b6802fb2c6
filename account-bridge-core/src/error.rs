//! Unified error type definition.

use serde::Serialize;
use thiserror::Error;

use account_bridge_provider::{AccountId, ProviderError};

/// Core layer error type.
///
/// Binding a provider sub-service to a local account name can stop for
/// reasons that are legitimate states of the provider registry rather
/// than bugs; those are the "expected" variants. Provider failures are
/// transient external errors. Nothing here ever crosses the storage
/// boundary: handlers log and move on.
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// The account carries no manager/protocol metadata yet.
    #[error("account {account_id} has no manager/protocol metadata")]
    MissingMetadata {
        /// Account that cannot be named.
        account_id: AccountId,
    },

    /// The sub-service has no authentication data to resolve a name from.
    #[error("account {account_id} has no authentication data")]
    MissingAuthData {
        /// Account that cannot be named.
        account_id: AccountId,
    },

    /// The credential resolved, but to no identifying name.
    #[error("credential {credentials_id} resolves to no identifying name")]
    EmptyCredentialName {
        /// Credential handle that was queried.
        credentials_id: u32,
    },

    /// The account was deleted while a credential lookup was in flight.
    #[error("account {account_id} was deleted during the credential lookup")]
    AccountVanished {
        /// Account that is no longer in the directory.
        account_id: AccountId,
    },

    /// Provider registry error (converted from the provider crate).
    #[error("{0}")]
    Provider(#[from] ProviderError),
}

impl CoreError {
    /// Whether this is an expected state of the provider registry
    /// (incomplete account, racing deletion) rather than a failure.
    ///
    /// Used for log classification: `debug` when `true`, `warn` when
    /// `false`. Update this when adding variants.
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::MissingMetadata { .. }
            | Self::MissingAuthData { .. }
            | Self::EmptyCredentialName { .. }
            | Self::AccountVanished { .. } => true,
            Self::Provider(_) => false,
        }
    }
}

/// Core layer Result type alias.
pub type CoreResult<T> = std::result::Result<T, CoreError>;
