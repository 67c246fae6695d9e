//! Verification of signed RPC queries.
//!
//! The receiving side of the scheme. A signed query carries everything needed
//! to recompute its signature:
//!
//! - `AccessKeyId` - selects the secret from an [`AccessKeyStore`]
//! - `SignatureMethod` - selects the algorithm
//! - `Timestamp` - checked against an accepted clock skew
//! - `SignatureNonce` - returned to the caller for replay tracking
//! - `Signature` - compared in constant time against the recomputed value
//!
//! The signature covers every other parameter, so it is removed from the map
//! before the string to sign is rebuilt.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use percent_encoding::percent_decode_str;
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::error::AuthError;
use crate::signature::{SignatureMethod, compute_rpc_signature};

/// Format of the `Timestamp` parameter.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Looks up the secret for an access key ID.
pub trait AccessKeyStore: Send + Sync {
    /// Return the secret of `access_key_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UnknownAccessKey`] if the key is not known.
    fn secret_for(&self, access_key_id: &str) -> Result<String, AuthError>;
}

/// In-memory [`AccessKeyStore`].
#[derive(Debug, Clone, Default)]
pub struct StaticAccessKeyStore {
    keys: HashMap<String, String>,
}

impl StaticAccessKeyStore {
    /// Create a store from `(access_key_id, secret)` pairs.
    #[must_use]
    pub fn new(keys: Vec<(String, String)>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }
}

impl AccessKeyStore for StaticAccessKeyStore {
    fn secret_for(&self, access_key_id: &str) -> Result<String, AuthError> {
        self.keys
            .get(access_key_id)
            .cloned()
            .ok_or_else(|| AuthError::UnknownAccessKey(access_key_id.to_owned()))
    }
}

/// Outcome of a successful verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedQuery {
    /// The access key that signed the query.
    pub access_key_id: String,
    /// The `Action` parameter, if present.
    pub action: Option<String>,
    /// The `SignatureNonce` parameter, if present.
    pub nonce: Option<String>,
    /// The parsed `Timestamp`.
    pub timestamp: DateTime<Utc>,
    /// All parameters except `Signature`.
    pub params: BTreeMap<String, String>,
}

/// Parse a raw query string into a decoded parameter map.
///
/// Later duplicates of a key replace earlier ones.
///
/// # Errors
///
/// Returns [`AuthError::InvalidQueryEncoding`] if a key or value does not
/// decode to UTF-8.
pub fn parse_query(query: &str) -> Result<BTreeMap<String, String>, AuthError> {
    query
        .split('&')
        .filter(|s| !s.is_empty())
        .map(|param| {
            let (key, value) = param.split_once('=').unwrap_or((param, ""));
            Ok((url_decode(key)?, url_decode(value)?))
        })
        .collect()
}

/// Parse a `Timestamp` parameter value.
///
/// # Errors
///
/// Returns [`AuthError::InvalidTimestamp`] if the value is not in
/// `YYYY-MM-DDThh:mm:ssZ` form.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, AuthError> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| AuthError::InvalidTimestamp(value.to_owned()))
}

/// Verify a signed RPC query.
///
/// This function:
/// 1. Decodes the query and removes `Signature`
/// 2. Checks `Timestamp` lies within `max_skew` of `now`
/// 3. Resolves the secret of `AccessKeyId`
/// 4. Recomputes the signature with the declared `SignatureMethod`
/// 5. Compares signatures in constant time
///
/// # Errors
///
/// Returns an [`AuthError`] if a required parameter is missing, the timestamp
/// is malformed or outside the window, the method is unsupported, the access
/// key is unknown, or the signature does not match.
pub fn verify_rpc_query(
    http_method: &str,
    query: &str,
    store: &dyn AccessKeyStore,
    now: DateTime<Utc>,
    max_skew: Duration,
) -> Result<VerifiedQuery, AuthError> {
    let mut params = parse_query(query)?;

    let provided_signature = params
        .remove("Signature")
        .ok_or_else(|| AuthError::MissingQueryParam("Signature".to_owned()))?;
    let access_key_id = required(&params, "AccessKeyId")?;
    let timestamp_str = required(&params, "Timestamp")?;
    let method: SignatureMethod = required(&params, "SignatureMethod")?.parse()?;

    let timestamp = parse_timestamp(&timestamp_str)?;
    if (now - timestamp).abs() > max_skew {
        debug!(timestamp = %timestamp_str, now = %now, "RPC query outside accepted window");
        return Err(AuthError::RequestExpired(timestamp_str));
    }

    debug!(access_key_id = %access_key_id, method = %method, "Verifying RPC signature");

    let secret = store.secret_for(&access_key_id)?;
    let expected_signature =
        compute_rpc_signature(method.algorithm().as_ref(), &secret, http_method, &params);

    if provided_signature
        .as_bytes()
        .ct_eq(expected_signature.as_bytes())
        .into()
    {
        debug!(access_key_id = %access_key_id, "RPC signature verification succeeded");
        Ok(VerifiedQuery {
            access_key_id,
            action: params.get("Action").cloned(),
            nonce: params.get("SignatureNonce").cloned(),
            timestamp,
            params,
        })
    } else {
        debug!(access_key_id = %access_key_id, "RPC signature mismatch");
        Err(AuthError::SignatureDoesNotMatch)
    }
}

fn required(params: &BTreeMap<String, String>, name: &str) -> Result<String, AuthError> {
    params
        .get(name)
        .cloned()
        .ok_or_else(|| AuthError::MissingQueryParam(name.to_owned()))
}

fn url_decode(s: &str) -> Result<String, AuthError> {
    percent_decode_str(s)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|_| AuthError::InvalidQueryEncoding(s.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::build_canonical_query;
    use crate::signature::HmacSha1Signature;

    const ACCESS_KEY: &str = "testid";
    const SECRET: &str = "testsecret";

    fn store() -> StaticAccessKeyStore {
        StaticAccessKeyStore::new(vec![(ACCESS_KEY.to_owned(), SECRET.to_owned())])
    }

    fn signed_query(timestamp: &str) -> String {
        let mut params: BTreeMap<String, String> = [
            ("AccessKeyId", ACCESS_KEY),
            ("Action", "DescribeRegions"),
            ("Format", "json"),
            ("SignatureMethod", "HMAC-SHA1"),
            ("SignatureNonce", "nonce-1"),
            ("SignatureVersion", "1.0"),
            ("Timestamp", timestamp),
            ("RegionId", "us-1 east"),
        ]
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
        let signature = compute_rpc_signature(&HmacSha1Signature, SECRET, "GET", &params);
        params.insert("Signature".to_owned(), signature);
        build_canonical_query(&params)
    }

    fn at(value: &str) -> DateTime<Utc> {
        parse_timestamp(value).unwrap()
    }

    #[test]
    fn test_should_parse_timestamp() {
        let ts = parse_timestamp("2024-01-02T03:04:05Z").unwrap();
        assert_eq!(ts.format(TIMESTAMP_FORMAT).to_string(), "2024-01-02T03:04:05Z");
        assert!(parse_timestamp("2024-01-02T03:04:05.123Z").is_err());
        assert!(parse_timestamp("2024-01-02 03:04:05").is_err());
    }

    #[test]
    fn test_should_decode_query() {
        let params = parse_query("a=x%20y&b=%2A&empty=&flag").unwrap();
        assert_eq!(params["a"], "x y");
        assert_eq!(params["b"], "*");
        assert_eq!(params["empty"], "");
        assert_eq!(params["flag"], "");
    }

    #[test]
    fn test_should_verify_signed_query() {
        let query = signed_query("2024-01-02T03:04:05Z");
        let verified = verify_rpc_query(
            "GET",
            &query,
            &store(),
            at("2024-01-02T03:06:00Z"),
            Duration::minutes(15),
        )
        .unwrap();

        assert_eq!(verified.access_key_id, ACCESS_KEY);
        assert_eq!(verified.action.as_deref(), Some("DescribeRegions"));
        assert_eq!(verified.nonce.as_deref(), Some("nonce-1"));
        assert_eq!(verified.params["RegionId"], "us-1 east");
        assert!(!verified.params.contains_key("Signature"));
    }

    #[test]
    fn test_should_reject_tampered_query() {
        let query =
            signed_query("2024-01-02T03:04:05Z").replace("DescribeRegions", "DeleteRegions");
        let result = verify_rpc_query(
            "GET",
            &query,
            &store(),
            at("2024-01-02T03:04:05Z"),
            Duration::minutes(15),
        );
        assert!(matches!(result, Err(AuthError::SignatureDoesNotMatch)));
    }

    #[test]
    fn test_should_reject_wrong_method() {
        let query = signed_query("2024-01-02T03:04:05Z");
        let result = verify_rpc_query(
            "POST",
            &query,
            &store(),
            at("2024-01-02T03:04:05Z"),
            Duration::minutes(15),
        );
        assert!(matches!(result, Err(AuthError::SignatureDoesNotMatch)));
    }

    #[test]
    fn test_should_reject_stale_timestamp() {
        let query = signed_query("2024-01-02T03:04:05Z");
        let result = verify_rpc_query(
            "GET",
            &query,
            &store(),
            at("2024-01-02T04:00:00Z"),
            Duration::minutes(15),
        );
        assert!(matches!(result, Err(AuthError::RequestExpired(_))));
    }

    #[test]
    fn test_should_reject_unknown_access_key() {
        let query = signed_query("2024-01-02T03:04:05Z");
        let empty = StaticAccessKeyStore::default();
        let result = verify_rpc_query(
            "GET",
            &query,
            &empty,
            at("2024-01-02T03:04:05Z"),
            Duration::minutes(15),
        );
        assert!(matches!(result, Err(AuthError::UnknownAccessKey(ref k)) if k == ACCESS_KEY));
    }

    #[test]
    fn test_should_require_signature_parameter() {
        let result = verify_rpc_query(
            "GET",
            "AccessKeyId=testid",
            &store(),
            Utc::now(),
            Duration::minutes(15),
        );
        assert!(matches!(result, Err(AuthError::MissingQueryParam(ref p)) if p == "Signature"));
    }

    #[test]
    fn test_should_reject_query_with_invalid_utf8() {
        assert!(matches!(
            parse_query("Name=%FF%FE"),
            Err(AuthError::InvalidQueryEncoding(ref v)) if v == "%FF%FE"
        ));

        let query = format!("{}&Name=%C3%28", signed_query("2024-01-02T03:04:05Z"));
        let result = verify_rpc_query(
            "GET",
            &query,
            &store(),
            at("2024-01-02T03:04:05Z"),
            Duration::minutes(15),
        );
        assert!(matches!(result, Err(AuthError::InvalidQueryEncoding(_))));
    }
}
