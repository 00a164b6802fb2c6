use serde::{Deserialize, Serialize};

// ============ Identifiers ============

/// Opaque numeric identifier of a provider account.
///
/// Allocated by the provider registry; this library never invents ids,
/// it only carries them around. The id is the join key between change
/// notifications (which carry only the id) and account handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub u32);

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// ============ Settings ============

/// A typed setting value as stored by the provider registry.
///
/// The registry's settings store is typed; consumers that only speak
/// strings (such as the messaging-account manager) must translate.
/// Only the boolean and string-like variants have a faithful string
/// rendering; everything else is opaque to string consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum SettingValue {
    /// Boolean flag.
    Bool(bool),
    /// Plain UTF-8 string.
    Str(String),
    /// Object-path-like string (bus object reference).
    ObjectPath(String),
    /// Type-signature-like string.
    Signature(String),
    /// Signed integer. Has no string rendering for string consumers.
    Int(i64),
}

impl SettingValue {
    /// Short name of the variant, used in "unsupported type" log lines.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Str(_) => "string",
            Self::ObjectPath(_) => "object-path",
            Self::Signature(_) => "signature",
            Self::Int(_) => "int",
        }
    }

    /// Borrow the inner string of a string-like variant.
    ///
    /// Returns `None` for [`Bool`](Self::Bool) and [`Int`](Self::Int);
    /// booleans are rendered by the consumer, not borrowed.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) | Self::ObjectPath(s) | Self::Signature(s) => Some(s),
            Self::Bool(_) | Self::Int(_) => None,
        }
    }
}

// ============ Authentication ============

/// Authentication data attached to a sub-service.
///
/// The only part the bridge consumes is the credential id, which can be
/// resolved to an identifying name through a [`CredentialResolver`].
///
/// [`CredentialResolver`]: crate::CredentialResolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthData {
    /// Handle into the credential store.
    pub credentials_id: u32,
}

// ============ Provider metadata ============

/// Static metadata about an account provider (the brand, not an account).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    /// Machine name, e.g. `google`.
    pub name: String,
    /// Human-readable name, e.g. `Google`.
    pub display_name: String,
    /// Icon name from the provider's desktop metadata; may be empty.
    pub icon_name: String,
}
