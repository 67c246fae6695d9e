//! The RPC client adapter.

use std::sync::Arc;

use http::Method;
use rpcsign_auth::canonical::build_canonical_query;
use rpcsign_auth::{HmacSha1Signature, compute_rpc_signature};
use rpcsign_core::{RpcClientConfig, RpcResult};
use serde_json::{Map, Value};
use tracing::debug;

use crate::handle::ClientHandle;
use crate::resolver::ClientResolver;
use crate::signer::{self, ParameterMap};

/// Signs requests for one fixed endpoint on behalf of one client name.
#[derive(Debug, Clone)]
pub struct RpcClient {
    client_name: Option<String>,
    endpoint: String,
    options: Map<String, Value>,
    resolver: Arc<ClientResolver>,
}

impl RpcClient {
    /// Create an adapter from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::InvalidArgument`](rpcsign_core::RpcError::InvalidArgument)
    /// if the endpoint is empty.
    pub fn new(config: RpcClientConfig, resolver: Arc<ClientResolver>) -> RpcResult<Self> {
        config.validate()?;
        debug!(
            endpoint = %config.endpoint,
            client = config.client_name.as_deref().unwrap_or(resolver.default_name().as_str()),
            "Created RPC client"
        );
        Ok(Self {
            client_name: config.client_name,
            endpoint: config.endpoint,
            options: config.options,
            resolver,
        })
    }

    /// The handle of this adapter's client, resolving it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::Configuration`](rpcsign_core::RpcError::Configuration)
    /// if no credential can be resolved for the client name.
    pub fn client(&self) -> RpcResult<Arc<ClientHandle>> {
        self.resolver.resolve(self.client_name.as_deref())
    }

    /// Return the signed parameter set for a request.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::Configuration`](rpcsign_core::RpcError::Configuration)
    /// if the client cannot be resolved, or
    /// [`RpcError::Signing`](rpcsign_core::RpcError::Signing) if its
    /// credential cannot sign.
    pub fn query(&self, params: ParameterMap, method: &Method) -> RpcResult<ParameterMap> {
        let handle = self.client()?;
        signer::sign(params, method, &handle)
    }

    /// Render a parameter set as a percent-encoded query string.
    #[must_use]
    pub fn to_query_string(params: &ParameterMap) -> String {
        build_canonical_query(params)
    }

    /// HMAC-SHA1 signature of `params` with `secret`, independent of any
    /// resolved client.
    #[must_use]
    pub fn signature_for(params: &ParameterMap, method: &Method, secret: &str) -> String {
        compute_rpc_signature(&HmacSha1Signature, secret, method.as_str(), params)
    }

    /// The host for `product` in `region`.
    ///
    /// Endpoints are not resolved per product or region; this is always the
    /// configured host.
    #[must_use]
    pub fn endpoint(&self, _product: &str, _region: &str) -> &str {
        &self.endpoint
    }

    /// Access key ID of this adapter's client.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::Configuration`](rpcsign_core::RpcError::Configuration)
    /// if the client cannot be resolved.
    pub fn access_key_id(&self) -> RpcResult<String> {
        Ok(self.client()?.credential().access_key_id().to_owned())
    }

    /// The client name this adapter resolves, if one was configured.
    #[must_use]
    pub fn client_name(&self) -> Option<&str> {
        self.client_name.as_deref()
    }

    /// Pass-through construction options.
    #[must_use]
    pub fn options(&self) -> &Map<String, Value> {
        &self.options
    }
}
