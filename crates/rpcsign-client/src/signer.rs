//! Request signing.
//!
//! Signing adds the authentication parameters to a caller's parameter map and
//! then computes `Signature` over everything else. The caller's own
//! parameters are carried through unchanged, except that reserved names are
//! overwritten with the values the signer owns.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use http::Method;
use rpcsign_auth::verify::TIMESTAMP_FORMAT;
use rpcsign_auth::{AuthError, compute_rpc_signature};
use rpcsign_core::RpcResult;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::handle::ClientHandle;

/// Request parameters, ordered by key.
pub type ParameterMap = BTreeMap<String, String>;

/// `Format` parameter.
pub const FORMAT: &str = "Format";
/// `SignatureMethod` parameter.
pub const SIGNATURE_METHOD: &str = "SignatureMethod";
/// `SignatureVersion` parameter.
pub const SIGNATURE_VERSION: &str = "SignatureVersion";
/// `SignatureNonce` parameter.
pub const SIGNATURE_NONCE: &str = "SignatureNonce";
/// `Timestamp` parameter.
pub const TIMESTAMP: &str = "Timestamp";
/// `AccessKeyId` parameter.
pub const ACCESS_KEY_ID: &str = "AccessKeyId";
/// `SignatureType` parameter.
pub const SIGNATURE_TYPE: &str = "SignatureType";
/// `SecurityToken` parameter, present only for temporary credentials.
pub const SECURITY_TOKEN: &str = "SecurityToken";
/// `Signature` parameter.
pub const SIGNATURE: &str = "Signature";

/// Response format requested from the service.
pub const RESPONSE_FORMAT: &str = "json";

const RESERVED: [&str; 9] = [
    FORMAT,
    SIGNATURE_METHOD,
    SIGNATURE_VERSION,
    SIGNATURE_NONCE,
    TIMESTAMP,
    ACCESS_KEY_ID,
    SIGNATURE_TYPE,
    SECURITY_TOKEN,
    SIGNATURE,
];

/// Sign `params` for `method` with a fresh nonce and the current time.
///
/// # Errors
///
/// Returns [`RpcError::Signing`](rpcsign_core::RpcError::Signing) if the
/// handle's credential has an empty secret.
pub fn sign(
    params: ParameterMap,
    method: &Method,
    handle: &ClientHandle,
) -> RpcResult<ParameterMap> {
    sign_at(params, method, handle, &generate_nonce(), Utc::now())
}

/// Sign `params` with an explicit nonce and timestamp.
///
/// # Errors
///
/// Returns [`RpcError::Signing`](rpcsign_core::RpcError::Signing) if the
/// handle's credential has an empty secret.
pub fn sign_at(
    mut params: ParameterMap,
    method: &Method,
    handle: &ClientHandle,
    nonce: &str,
    timestamp: DateTime<Utc>,
) -> RpcResult<ParameterMap> {
    let credential = handle.credential();
    if credential.access_key_secret().is_empty() {
        return Err(AuthError::EmptySecret(credential.access_key_id().to_owned()).into());
    }

    for key in RESERVED {
        if params.remove(key).is_some() {
            warn!(client = %handle.name(), parameter = key, "Overwriting reserved parameter");
        }
    }

    let mut set = |key: &str, value: &str| {
        params.insert(key.to_owned(), value.to_owned());
    };
    set(FORMAT, RESPONSE_FORMAT);
    set(SIGNATURE_METHOD, handle.signature_method());
    set(SIGNATURE_VERSION, handle.signature_version());
    set(SIGNATURE_NONCE, nonce);
    set(TIMESTAMP, &format_timestamp(timestamp));
    set(ACCESS_KEY_ID, credential.access_key_id());
    set(SIGNATURE_TYPE, handle.signature_type());
    if let Some(token) = credential.security_token() {
        set(SECURITY_TOKEN, token);
    }

    let signature = compute_rpc_signature(
        handle.algorithm(),
        credential.access_key_secret(),
        method.as_str(),
        &params,
    );

    debug!(
        client = %handle.name(),
        http_method = %method,
        nonce,
        parameters = params.len(),
        "Signed RPC request"
    );

    params.insert(SIGNATURE.to_owned(), signature);
    Ok(params)
}

/// A fresh `SignatureNonce`.
///
/// Version 7 UUIDs lead with a millisecond timestamp followed by random bits,
/// so concurrent signers in one process never collide.
#[must_use]
pub fn generate_nonce() -> String {
    Uuid::now_v7().to_string()
}

/// Render `timestamp` as `YYYY-MM-DDThh:mm:ssZ`.
#[must_use]
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}
