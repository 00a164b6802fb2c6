//! Typed-to-string settings translation under the bridge's key namespace.
//!
//! The provider registry stores typed values; the local manager only
//! speaks strings. Every key this module touches lives under
//! [`SETTING_PREFIX`]; the prefix never leaks into keys exposed to the
//! local manager.

use account_bridge_provider::{AccountService, SettingValue};

/// Namespace prefix for every setting owned by the bridge.
pub const SETTING_PREFIX: &str = "messaging/";

/// Reserved key holding the bound local account name. Written once per
/// sub-service; never reassigned.
pub const KEY_LOCAL_NAME: &str = "local-account-name";

/// Cached identifying value (the "account" connection parameter). When
/// present, binding skips the credential lookup.
pub const KEY_ACCOUNT_PARAM: &str = "param-account";

/// Boolean marker: connection parameters are read-only for the local
/// manager.
pub const KEY_READONLY_PARAMS: &str = "readonly-params";

pub(crate) const KEY_MANAGER: &str = "manager";
pub(crate) const KEY_PROTOCOL: &str = "protocol";

fn namespaced(key: &str) -> String {
    format!("{SETTING_PREFIX}{key}")
}

/// Render a typed value for the local manager.
///
/// Booleans become `"true"`/`"false"`, string-like values pass through
/// verbatim. Anything else has no string rendering: it yields `None`
/// (not an error) and leaves a debug line behind.
pub(crate) fn to_string_value(value: &SettingValue) -> Option<String> {
    match value {
        SettingValue::Bool(true) => Some("true".to_string()),
        SettingValue::Bool(false) => Some("false".to_string()),
        other => match other.as_str() {
            Some(s) => Some(s.to_string()),
            None => {
                log::debug!("setting type {} has no string form", other.type_name());
                None
            }
        },
    }
}

/// Read one namespaced setting as a string.
pub(crate) fn read(service: &dyn AccountService, key: &str) -> Option<String> {
    service
        .value(&namespaced(key))
        .and_then(|value| to_string_value(&value))
}

/// Write one namespaced setting as a string, or clear it with `None`.
pub(crate) fn write(service: &dyn AccountService, key: &str, value: Option<&str>) {
    service.set_value(
        &namespaced(key),
        value.map(|value| SettingValue::Str(value.to_string())),
    );
}

/// Decode every namespaced setting. Keys come back without the prefix;
/// values without a string form are omitted.
pub(crate) fn read_all(service: &dyn AccountService) -> Vec<(String, String)> {
    service
        .settings_with_prefix(SETTING_PREFIX)
        .into_iter()
        .filter_map(|(key, value)| to_string_value(&value).map(|value| (key, value)))
        .collect()
}

/// Read a namespaced boolean marker. Only a stored `Bool(true)` counts.
pub(crate) fn read_flag(service: &dyn AccountService, key: &str) -> bool {
    matches!(
        service.value(&namespaced(key)),
        Some(SettingValue::Bool(true))
    )
}
