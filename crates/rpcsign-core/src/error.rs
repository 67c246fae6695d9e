//! Error types surfaced by RpcSign.

/// Error taxonomy for client resolution, request signing, and response
/// classification.
///
/// Nothing in RpcSign retries or recovers from these; each variant carries
/// the offending name or field so the caller can diagnose the failure.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// A required construction option is missing or empty.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No client or credential could be resolved for the requested name.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The credential could not be used or the signature method is unsupported.
    #[error("signing error: {0}")]
    Signing(String),

    /// An error payload lacks a required field.
    #[error("malformed response: missing field `{0}`")]
    MalformedResponse(String),
}

impl RpcError {
    /// Build the error returned when a name is absent from the registry.
    #[must_use]
    pub fn client_not_found(name: &str) -> Self {
        Self::Configuration(format!("client not found: {name}"))
    }
}

/// Convenience result type for RpcSign operations.
pub type RpcResult<T> = Result<T, RpcError>;
