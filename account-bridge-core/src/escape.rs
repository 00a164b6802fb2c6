//! Identifier escaping shared with the local manager's naming scheme.

use std::fmt::Write;

/// Escape `input` into a valid identifier.
///
/// ASCII alphanumerics pass through; every other byte — and a digit in
/// the leading position — is replaced by `_` followed by two lowercase
/// hex digits. `_` itself is escaped because it is the escape character.
/// The empty string escapes to `_`.
///
/// This must stay byte-for-byte compatible with the escaping the local
/// manager applies when it mints names itself, since names from several
/// storage backends share one namespace.
pub(crate) fn escape_as_identifier(input: &str) -> String {
    if input.is_empty() {
        return "_".to_string();
    }

    let mut escaped = String::with_capacity(input.len());
    for (position, byte) in input.bytes().enumerate() {
        let literal = byte.is_ascii_alphanumeric() && !(position == 0 && byte.is_ascii_digit());
        if literal {
            escaped.push(char::from(byte));
        } else {
            // Infallible for String.
            let _ = write!(escaped, "_{byte:02x}");
        }
    }
    escaped
}
