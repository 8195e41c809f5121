//! Open-redirect prevention for `callbackUrl` handling.
//!
//! Every externally supplied redirect target goes through [`safe_decode`] and
//! [`is_valid_redirect_path`] before it is used in a `Location` header. A
//! target that fails either check is silently replaced by
//! [`DEFAULT_DESTINATION`]; a bad `callbackUrl` is malformed input, not an
//! error the user ever sees.

use std::borrow::Cow;

/// Where users land when no (valid) `callbackUrl` was carried along.
pub const DEFAULT_DESTINATION: &str = "/dashboard";

/// Check whether a path is safe to redirect to.
///
/// 1. Must start with `/`
/// 2. Must NOT start with `//` (protocol-relative URLs)
/// 3. Must NOT contain `://` (absolute URLs, including `/x/https://evil.com`)
///
/// `..` traversal segments are not rejected here; path resolution is the
/// same-origin router's job.
#[must_use]
pub fn is_valid_redirect_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.contains("://")
}

/// Percent-decode a query parameter without ever panicking.
///
/// Returns `None` for malformed escape sequences (a `%` not followed by two
/// hex digits, e.g. `"%"` or `"%2"`) and for escapes that decode to invalid
/// UTF-8 (e.g. a truncated multi-byte sequence).
#[must_use]
pub fn safe_decode(value: &str) -> Option<String> {
    if !escapes_well_formed(value.as_bytes()) {
        return None;
    }
    urlencoding::decode(value).ok().map(Cow::into_owned)
}

/// Resolve the destination for a raw `callbackUrl` query parameter.
///
/// Decoding failures and unsafe paths both fall back to
/// [`DEFAULT_DESTINATION`].
#[must_use]
pub fn resolve_destination(callback_url: Option<&str>) -> String {
    callback_url
        .and_then(safe_decode)
        .filter(|decoded| is_valid_redirect_path(decoded))
        .unwrap_or_else(|| DEFAULT_DESTINATION.to_string())
}

/// Every `%` must be followed by exactly two hex digits.
/// The decoder crate passes lone `%` through verbatim, which would turn
/// malformed input into a "successful" decode; reject it up front instead.
fn escapes_well_formed(bytes: &[u8]) -> bool {
    let mut index = 0;
    while index < bytes.len() {
        if bytes[index] == b'%' {
            let Some(rest) = bytes.get(index + 1..index + 3) else {
                return false;
            };
            if !rest.iter().all(u8::is_ascii_hexdigit) {
                return false;
            }
            index += 3;
        } else {
            index += 1;
        }
    }
    true
}
