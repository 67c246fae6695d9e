//! Canonical string construction for RPC-style query signing.
//!
//! The string to sign is built from the full parameter map:
//!
//! ```text
//! CanonicalQuery = join("&", sorted(PercentEncode(key) + "=" + PercentEncode(value)))
//! StringToSign   = HTTPMethod + "&" + PercentEncode("/") + "&" + PercentEncode(CanonicalQuery)
//! ```
//!
//! Keys are sorted ascending by byte value, before encoding.

use std::collections::BTreeMap;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters that must be percent-encoded in keys and values.
///
/// Everything except RFC 3986 unreserved characters (A-Z, a-z, 0-9, `-`,
/// `_`, `.`, `~`). Spaces become `%20` and `*` becomes `%2A`.
const RPC_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode a key or value using the RPC signing rules.
///
/// # Examples
///
/// ```
/// use rpcsign_auth::canonical::percent_encode;
///
/// assert_eq!(percent_encode("a b*c~d/"), "a%20b%2Ac~d%2F");
/// ```
#[must_use]
pub fn percent_encode(input: &str) -> String {
    utf8_percent_encode(input, RPC_ENCODE_SET).to_string()
}

/// Build the canonical query string from a parameter map.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
///
/// use rpcsign_auth::canonical::build_canonical_query;
///
/// let params = BTreeMap::from([
///     ("b".to_owned(), "2".to_owned()),
///     ("a".to_owned(), "x y".to_owned()),
/// ]);
/// assert_eq!(build_canonical_query(&params), "a=x%20y&b=2");
/// ```
#[must_use]
pub fn build_canonical_query(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Build the string to sign for an HTTP method and parameter map.
///
/// The method is upper-cased; the path segment is always `/`.
#[must_use]
pub fn build_string_to_sign(http_method: &str, params: &BTreeMap<String, String>) -> String {
    let method = http_method.to_ascii_uppercase();
    let canonical_query = build_canonical_query(params);
    format!(
        "{method}&{}&{}",
        percent_encode("/"),
        percent_encode(&canonical_query)
    )
}
