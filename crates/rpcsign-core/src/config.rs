//! Configuration management for RpcSign clients.
//!
//! All configuration can be driven by environment variables. The `from_lookup`
//! constructors take the variable source as a closure so the same parsing runs
//! against the process environment or a fixed map.

use std::env;

use serde_json::{Map, Value};

use crate::error::{RpcError, RpcResult};
use crate::types::ClientName;

/// Construction-time configuration of an RPC client adapter.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcClientConfig {
    /// Host every request is sent to. Required and non-empty.
    #[serde(default)]
    pub endpoint: String,
    /// Client name to resolve; `None` selects the resolver's default.
    #[serde(default)]
    pub client_name: Option<String>,
    /// Pass-through options (transport settings and the like), never
    /// interpreted by the signer.
    #[serde(default)]
    pub options: Map<String, Value>,
}

impl RpcClientConfig {
    /// Create a configuration for the given endpoint.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `RPC_ENDPOINT` | `endpoint` |
    /// | `RPC_CLIENT_NAME` | `client_name` |
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key: &str| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            endpoint: lookup("RPC_ENDPOINT").unwrap_or_default(),
            client_name: lookup("RPC_CLIENT_NAME").filter(|v| !v.is_empty()),
            options: Map::new(),
        }
    }

    /// Set the client name.
    #[must_use]
    pub fn with_client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = Some(name.into());
        self
    }

    /// Attach a pass-through option.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    /// Check the required options.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::InvalidArgument`] if `endpoint` is empty.
    pub fn validate(&self) -> RpcResult<()> {
        if self.endpoint.trim().is_empty() {
            return Err(RpcError::InvalidArgument(
                "endpoint can not be empty".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Configuration of client resolution.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverConfig {
    /// Name substituted when a caller resolves without a name.
    pub default_client_name: ClientName,
    /// Signature method bound to newly registered clients.
    pub signature_method: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            default_client_name: ClientName::default(),
            signature_method: "HMAC-SHA1".to_owned(),
        }
    }
}

impl ResolverConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default | Field |
    /// |----------|---------|-------|
    /// | `ALIBABA_CLOUD_PROFILE` | `default` | `default_client_name` |
    /// | `RPC_SIGNATURE_METHOD` | `HMAC-SHA1` | `signature_method` |
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key: &str| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = lookup("ALIBABA_CLOUD_PROFILE").filter(|v| !v.is_empty()) {
            config.default_client_name = ClientName::new(v);
        }
        if let Some(v) = lookup("RPC_SIGNATURE_METHOD").filter(|v| !v.is_empty()) {
            config.signature_method = v;
        }

        config
    }
}
