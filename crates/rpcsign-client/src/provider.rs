//! Strategies for establishing a client handle on first use.
//!
//! When the registry holds no clients at all, the resolver builds one through
//! either a caller-installed [`CustomChainProvider`] or the
//! [`DefaultChainProvider`] (environment, instance metadata, credentials
//! file). The choice is made once per resolution.

use std::fmt;
use std::sync::Arc;

use rpcsign_auth::credentials::process_env;
use rpcsign_auth::{CredentialProvider, EnvLookup, MetadataFetcher, ProviderChain, SignatureMethod};
use rpcsign_core::{ClientName, RpcResult};
use tracing::info;

use crate::handle::ClientHandle;

/// Builds the handle for a client name.
pub trait ClientProvider: Send + Sync + fmt::Debug {
    /// Short strategy name used in logs.
    fn kind(&self) -> &'static str;

    /// Resolve the credential for `name` and bind it to `method`.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::Configuration`](rpcsign_core::RpcError::Configuration)
    /// if no credential can be resolved.
    fn provide(&self, name: &ClientName, method: SignatureMethod) -> RpcResult<ClientHandle>;
}

fn provide_from(
    kind: &'static str,
    chain: &ProviderChain,
    name: &ClientName,
    method: SignatureMethod,
) -> RpcResult<ClientHandle> {
    let credential = chain.provide(name.as_str())?;
    info!(
        strategy = kind,
        client = %name,
        access_key_id = credential.access_key_id(),
        method = %method,
        "Registered client"
    );
    Ok(ClientHandle::with_method(name.clone(), credential, method))
}

/// Provider chain installed by the application.
#[derive(Debug, Clone)]
pub struct CustomChainProvider {
    chain: ProviderChain,
}

impl CustomChainProvider {
    /// Wrap a caller-built chain.
    #[must_use]
    pub fn new(chain: ProviderChain) -> Self {
        Self { chain }
    }

    /// Build a chain from providers in priority order.
    #[must_use]
    pub fn from_providers(providers: Vec<Arc<dyn CredentialProvider>>) -> Self {
        Self::new(ProviderChain::new(providers))
    }
}

impl ClientProvider for CustomChainProvider {
    fn kind(&self) -> &'static str {
        "custom"
    }

    fn provide(&self, name: &ClientName, method: SignatureMethod) -> RpcResult<ClientHandle> {
        provide_from(self.kind(), &self.chain, name, method)
    }
}

/// The standard chain: environment variables, instance metadata, then the
/// credentials file.
#[derive(Debug, Clone)]
pub struct DefaultChainProvider {
    chain: ProviderChain,
}

impl DefaultChainProvider {
    /// Chain reading the process environment, without instance metadata.
    #[must_use]
    pub fn new() -> Self {
        Self::with_lookup(&process_env(), None)
    }

    /// Chain reading variables from `lookup`, with an optional metadata
    /// transport enabling the instance metadata step.
    #[must_use]
    pub fn with_lookup(lookup: &EnvLookup, fetcher: Option<Arc<dyn MetadataFetcher>>) -> Self {
        Self {
            chain: ProviderChain::standard(lookup, fetcher),
        }
    }

    /// Names of the providers consulted, in order.
    #[must_use]
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.chain.names()
    }
}

impl Default for DefaultChainProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientProvider for DefaultChainProvider {
    fn kind(&self) -> &'static str {
        "default"
    }

    fn provide(&self, name: &ClientName, method: SignatureMethod) -> RpcResult<ClientHandle> {
        provide_from(self.kind(), &self.chain, name, method)
    }
}
