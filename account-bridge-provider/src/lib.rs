//! # account-bridge-provider
//!
//! Abstraction over the platform's single-sign-on account registry: the
//! external system that owns accounts, their typed settings, enablement
//! flags, and credentials.
//!
//! The bridge core consumes this registry purely through the traits
//! defined here:
//!
//! - [`ProviderDirectory`] — account lookup and sub-service enumeration,
//!   scoped to one service class.
//! - [`ProviderAccount`] — account-global properties and asynchronous
//!   persistence.
//! - [`AccountService`] — one account scoped to one service class, with
//!   its typed settings namespace.
//! - [`CredentialResolver`] — asynchronous credential-id to identifying
//!   name resolution.
//!
//! The [`memory`] module provides a complete in-memory implementation of
//! all four traits, used by embedders without a platform registry and by
//! the test suites of everything layered on top.
//!
//! ## Quick Start
//!
//! ```rust
//! use account_bridge_provider::memory::MemoryDirectory;
//! use account_bridge_provider::{AccountService, ProviderDirectory, SettingValue};
//!
//! let directory = MemoryDirectory::new();
//! let account = directory.create_account("google", "alice@example.com");
//! let service = directory.add_service(&account, "google_im", "im-google");
//! service.set_value("messaging/protocol", Some(SettingValue::Str("jabber".into())));
//!
//! assert_eq!(directory.all_services().len(), 1);
//! ```

pub mod error;
pub mod memory;
pub mod traits;
pub mod types;

pub use error::{ProviderError, Result};
pub use traits::{AccountService, CredentialResolver, ProviderAccount, ProviderDirectory};
pub use types::{AccountId, AuthData, ProviderInfo, SettingValue};
