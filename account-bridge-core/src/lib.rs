//! # account-bridge-core
//!
//! Keeps two independent account registries consistent: the platform's
//! SSO provider registry (typed settings, credentials, enablement) and
//! the messaging-account manager's own store (string names, string
//! settings). Provider accounts appear, toggle, change, and vanish at
//! any time — including before the manager finishes starting up — and
//! some need an asynchronous credential lookup before they can be named
//! at all.
//!
//! The pieces:
//!
//! - a settings codec translating typed provider values to the
//!   manager's string model under the `messaging/` key namespace;
//! - the service registry index mapping local account names to provider
//!   sub-service handles, plus the pending set of observed-but-unnamed
//!   services;
//! - a deferred event queue buffering provider notifications until the
//!   manager signals readiness;
//! - the account binding protocol deriving deterministic local names,
//!   resolving identifying values through the credential store when
//!   nothing is cached;
//! - the storage adapter, the get/set/list/commit/ready surface the
//!   manager calls.
//!
//! Everything runs on the embedding single-threaded runtime; the
//! provider registry itself is reached only through the traits of
//! [`account_bridge_provider`].

pub mod error;
pub mod storage;

mod adapter;
mod binding;
mod bridge;
mod codec;
mod escape;
mod index;
mod queue;

pub use adapter::{STORAGE_DESCRIPTION, STORAGE_NAME, STORAGE_PRIORITY, STORAGE_PROVIDER};
pub use binding::derive_local_name;
pub use bridge::AccountBridge;
pub use codec::{KEY_ACCOUNT_PARAM, KEY_LOCAL_NAME, KEY_READONLY_PARAMS, SETTING_PREFIX};
pub use error::{CoreError, CoreResult};
pub use storage::{
    AccountInfo, AccountStorage, LocalManager, StorageDescriptor, StorageRestrictions,
    ATTR_DISPLAY_NAME, ATTR_ENABLED, ATTR_ICON, ATTR_SERVICE,
};
