//! Integration tests for RpcSign.
//!
//! These tests exercise the crates together: credential providers feeding the
//! resolver, the signer feeding server-side verification, and the adapter
//! built from configuration. Nothing here touches the network or the process
//! environment.
//!
//! Run them with:
//! ```text
//! cargo test -p rpcsign-integration
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Once};

use rpcsign_auth::{Credential, EnvLookup};
use rpcsign_client::{ClientResolver, DefaultChainProvider, ParameterMap};
use rpcsign_core::{ClientName, ClientRegistry, ResolverConfig};

mod test_client;
mod test_resolution;
mod test_signing;

static INIT: Once = Once::new();

/// Initialize tracing (once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// A variable source backed by a fixed map.
#[must_use]
pub fn lookup_from(pairs: &[(&str, &str)]) -> EnvLookup {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    Arc::new(move |key: &str| vars.get(key).cloned())
}

/// A resolver whose default chain reads only `pairs`.
#[must_use]
pub fn isolated_resolver(config: &ResolverConfig, pairs: &[(&str, &str)]) -> ClientResolver {
    init_tracing();
    ClientResolver::new(Arc::new(ClientRegistry::new()), config)
        .expect("resolver config is valid")
        .with_default_chain(DefaultChainProvider::with_lookup(&lookup_from(pairs), None))
}

/// A resolver with `test-id`/`test-secret` registered under the default name.
#[must_use]
pub fn registered_resolver() -> Arc<ClientResolver> {
    let resolver = isolated_resolver(&ResolverConfig::default(), &[]);
    resolver.register(
        ClientName::default(),
        Credential::new("test-id", "test-secret"),
    );
    Arc::new(resolver)
}

/// Build a parameter map from string pairs.
#[must_use]
pub fn params(pairs: &[(&str, &str)]) -> ParameterMap {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}
