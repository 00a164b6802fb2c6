use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::AccountId;

/// Unified error type for provider-registry operations.
///
/// All variants are serializable for structured error reporting. Callers
/// on the bridge side treat every variant as a transient external failure:
/// logged, never fatal, never retried automatically.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "camelCase")]
pub enum ProviderError {
    /// Persisting an account back into the registry failed.
    #[error("failed to store account {account_id}: {detail}")]
    StoreFailed {
        /// Account that could not be stored.
        account_id: AccountId,
        /// Error details from the registry.
        detail: String,
    },

    /// No credential record exists for the given credential id.
    #[error("no credential identity for id {credentials_id}")]
    IdentityNotFound {
        /// The dangling credential handle.
        credentials_id: u32,
    },

    /// The credential store answered the query with an error.
    #[error("credential query failed: {detail}")]
    QueryFailed {
        /// Error details from the credential store.
        detail: String,
    },
}

/// Result alias for provider-registry operations.
pub type Result<T> = std::result::Result<T, ProviderError>;
