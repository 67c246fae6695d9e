//! Client resolution.
//!
//! [`ClientResolver`] maps a client name to a [`ClientHandle`]. Precedence:
//!
//! 1. No name given: use the configured default name.
//! 2. Registry empty: register a handle for the name through the installed
//!    custom chain, or the default chain when none is installed.
//! 3. Look the name up; a miss is a configuration error.
//!
//! Registration goes through [`ClientRegistry::get_or_try_insert_with`], so
//! concurrent first resolutions of one name run the provider chain once and
//! share the resulting handle.

use std::sync::Arc;

use parking_lot::RwLock;
use rpcsign_auth::{Credential, ProviderChain, SignatureMethod};
use rpcsign_core::{ClientName, ClientRegistry, ResolverConfig, RpcError, RpcResult};
use tracing::{debug, info};

use crate::handle::ClientHandle;
use crate::provider::{ClientProvider, CustomChainProvider, DefaultChainProvider};

/// Resolves client names against an injected registry.
#[derive(Debug)]
pub struct ClientResolver {
    registry: Arc<ClientRegistry<ClientHandle>>,
    default_name: ClientName,
    method: SignatureMethod,
    default_chain: DefaultChainProvider,
    custom_chain: RwLock<Option<Arc<CustomChainProvider>>>,
}

impl ClientResolver {
    /// Create a resolver over `registry`, using the process environment for
    /// the default chain.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::Signing`] if the configured signature method is not
    /// supported.
    pub fn new(
        registry: Arc<ClientRegistry<ClientHandle>>,
        config: &ResolverConfig,
    ) -> RpcResult<Self> {
        let method: SignatureMethod = config.signature_method.parse()?;
        Ok(Self {
            registry,
            default_name: config.default_client_name.clone(),
            method,
            default_chain: DefaultChainProvider::new(),
            custom_chain: RwLock::new(None),
        })
    }

    /// Replace the default chain.
    #[must_use]
    pub fn with_default_chain(mut self, chain: DefaultChainProvider) -> Self {
        self.default_chain = chain;
        self
    }

    /// Install a custom chain, used instead of the default chain from now on.
    pub fn install_custom_chain(&self, chain: ProviderChain) {
        *self.custom_chain.write() = Some(Arc::new(CustomChainProvider::new(chain)));
    }

    /// Remove the custom chain.
    pub fn clear_custom_chain(&self) {
        *self.custom_chain.write() = None;
    }

    /// Whether a custom chain is installed.
    #[must_use]
    pub fn has_custom_chain(&self) -> bool {
        self.custom_chain.read().is_some()
    }

    /// The name used when a caller resolves without one.
    #[must_use]
    pub fn default_name(&self) -> &ClientName {
        &self.default_name
    }

    /// The signature method bound to handles this resolver registers.
    #[must_use]
    pub fn signature_method(&self) -> SignatureMethod {
        self.method
    }

    /// The registry this resolver reads and writes.
    #[must_use]
    pub fn registry(&self) -> &Arc<ClientRegistry<ClientHandle>> {
        &self.registry
    }

    /// Resolve `name` to a handle. A missing or empty name means the default
    /// name.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::Configuration`] if the provider chain yields no
    /// credential, or the registry is populated but has no entry for the name.
    pub fn resolve(&self, name: Option<&str>) -> RpcResult<Arc<ClientHandle>> {
        let name = name
            .filter(|n| !n.is_empty())
            .map_or_else(|| self.default_name.clone(), ClientName::new);

        if self.registry.is_empty() {
            let custom = self.custom_chain.read().clone();
            return match custom {
                Some(provider) => self.register_with(provider.as_ref(), &name),
                None => self.register_with(&self.default_chain, &name),
            };
        }

        debug!(client = %name, "Looking up registered client");
        self.registry
            .get(&name)
            .ok_or_else(|| RpcError::client_not_found(name.as_str()))
    }

    /// Register `name` through the default chain, unless already registered.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::Configuration`] if the chain yields no credential.
    pub fn register_default(&self, name: &ClientName) -> RpcResult<Arc<ClientHandle>> {
        self.register_with(&self.default_chain, name)
    }

    /// Register `name` through the installed custom chain, unless already
    /// registered.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::Configuration`] if no custom chain is installed or
    /// it yields no credential.
    pub fn register_custom(&self, name: &ClientName) -> RpcResult<Arc<ClientHandle>> {
        let provider = self.custom_chain.read().clone().ok_or_else(|| {
            RpcError::Configuration(format!("no custom provider chain installed for {name}"))
        })?;
        self.register_with(provider.as_ref(), name)
    }

    /// Register an explicit credential under `name`, replacing any existing
    /// handle.
    pub fn register(&self, name: ClientName, credential: Credential) -> Arc<ClientHandle> {
        let handle = ClientHandle::with_method(name.clone(), credential, self.method);
        info!(
            client = %name,
            access_key_id = handle.credential().access_key_id(),
            "Registered client"
        );
        self.registry.insert(name, handle)
    }

    fn register_with(
        &self,
        provider: &dyn ClientProvider,
        name: &ClientName,
    ) -> RpcResult<Arc<ClientHandle>> {
        debug!(
            client = %name,
            strategy = provider.kind(),
            "Resolving client through provider chain"
        );
        self.registry
            .get_or_try_insert_with(name, || provider.provide(name, self.method))
    }
}
