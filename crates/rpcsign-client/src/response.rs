//! Response classification.
//!
//! Any status of 400 or above is an error. The body of an error response is
//! a JSON document that must carry a string `message`; `code`, the request
//! ID, and `data` are carried along when present.

use http::{Response, StatusCode};
use rpcsign_core::{RpcError, RpcResult};
use serde_json::Value;

/// Whether `response` reports an error.
#[must_use]
pub fn has_error<B>(response: &Response<B>) -> bool {
    is_error_status(response.status())
}

/// Whether `status` is an error status (400 or above).
#[must_use]
pub fn is_error_status(status: StatusCode) -> bool {
    status.as_u16() >= 400
}

/// Error reported by the remote service.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ServiceError {
    /// Human-readable message from the payload.
    pub message: String,
    /// Service error code, if present.
    pub code: Option<String>,
    /// Request ID echoed by the service, if present.
    pub request_id: Option<String>,
    /// Additional structured data, if present.
    pub data: Option<Value>,
}

/// Wrap an error payload into a [`ServiceError`].
///
/// # Errors
///
/// Returns [`RpcError::MalformedResponse`] if `payload` has no string
/// `message` field.
pub fn to_error(payload: &Value) -> RpcResult<ServiceError> {
    let message = string_field(payload, &["message", "Message"])
        .ok_or_else(|| RpcError::MalformedResponse("message".to_owned()))?;

    Ok(ServiceError {
        message,
        code: string_field(payload, &["code", "Code"]),
        request_id: string_field(payload, &["requestId", "RequestId"]),
        data: payload.get("data").filter(|v| !v.is_null()).cloned(),
    })
}

fn string_field(payload: &Value, names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| payload.get(name).and_then(Value::as_str))
        .map(str::to_owned)
}
