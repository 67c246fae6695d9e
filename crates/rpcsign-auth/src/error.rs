//! Authentication and credential error types.

use std::path::PathBuf;

use rpcsign_core::RpcError;

/// Errors raised while signing or verifying an RPC query.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The requested signature method is not implemented.
    #[error("unsupported signature method: {0}")]
    UnsupportedSignatureMethod(String),

    /// The credential has no usable secret.
    #[error("credential for access key {0} has an empty secret")]
    EmptySecret(String),

    /// A required query parameter is missing.
    #[error("missing query parameter: {0}")]
    MissingQueryParam(String),

    /// A query key or value is not valid percent-encoded UTF-8.
    #[error("invalid query encoding: {0}")]
    InvalidQueryEncoding(String),

    /// The `Timestamp` parameter could not be parsed.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// The request timestamp is outside the accepted window.
    #[error("request timestamp {0} is outside the accepted window")]
    RequestExpired(String),

    /// The access key is not known to the key store.
    #[error("unknown access key: {0}")]
    UnknownAccessKey(String),

    /// The computed signature differs from the one provided.
    #[error("signature does not match")]
    SignatureDoesNotMatch,
}

/// Errors raised by credential providers.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// The provider has nothing configured; a chain moves on to the next one.
    #[error("{provider}: not configured")]
    NotConfigured {
        /// Provider that was consulted.
        provider: &'static str,
    },

    /// The provider is configured but its configuration is unusable.
    #[error("{provider}: {message}")]
    Invalid {
        /// Provider that failed.
        provider: &'static str,
        /// What was wrong.
        message: String,
    },

    /// A credentials file could not be read.
    #[error("{provider}: failed to read {}: {source}", .path.display())]
    Io {
        /// Provider that failed.
        provider: &'static str,
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A remote credential source could not be reached.
    #[error("{provider}: fetch failed: {message}")]
    Fetch {
        /// Provider that failed.
        provider: &'static str,
        /// Transport-level description of the failure.
        message: String,
    },

    /// Every provider of a chain reported that it was not configured.
    #[error("no credential provider yielded a credential for client {client} (tried: {tried})")]
    ChainExhausted {
        /// Client the chain was asked for.
        client: String,
        /// Comma-separated names of the providers consulted.
        tried: String,
    },
}

impl CredentialError {
    /// Whether a chain should fall through to its next provider.
    #[must_use]
    pub fn is_not_configured(&self) -> bool {
        matches!(self, Self::NotConfigured { .. })
    }

    pub(crate) fn invalid(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            provider,
            message: message.into(),
        }
    }
}

impl From<AuthError> for RpcError {
    fn from(err: AuthError) -> Self {
        Self::Signing(err.to_string())
    }
}

impl From<CredentialError> for RpcError {
    fn from(err: CredentialError) -> Self {
        Self::Configuration(err.to_string())
    }
}
