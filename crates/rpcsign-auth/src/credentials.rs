//! Credentials and credential providers.
//!
//! A [`CredentialProvider`] produces the access key pair used to sign
//! requests for a client. Providers are synchronous and may block on file or
//! network I/O. [`ProviderChain`] tries several providers in order, skipping
//! the ones that report they are not configured.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::CredentialError;
use crate::metadata::{InstanceMetadataProvider, MetadataFetcher};
use crate::profile::ProfileCredentialProvider;

/// Environment variable holding the access key ID.
pub const ENV_ACCESS_KEY_ID: &str = "ALIBABA_CLOUD_ACCESS_KEY_ID";
/// Environment variable holding the access key secret.
pub const ENV_ACCESS_KEY_SECRET: &str = "ALIBABA_CLOUD_ACCESS_KEY_SECRET";
/// Environment variable holding an optional session token.
pub const ENV_SECURITY_TOKEN: &str = "ALIBABA_CLOUD_SECURITY_TOKEN";

/// Source of environment variables, so providers can be driven by a fixed map
/// in tests.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Lookup backed by the process environment.
#[must_use]
pub fn process_env() -> EnvLookup {
    Arc::new(|key: &str| std::env::var(key).ok())
}

/// An access key pair, optionally with a session token.
///
/// The secret never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    access_key_id: String,
    access_key_secret: String,
    security_token: Option<String>,
}

impl Credential {
    /// Create a credential from a key pair.
    #[must_use]
    pub fn new(access_key_id: impl Into<String>, access_key_secret: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            access_key_secret: access_key_secret.into(),
            security_token: None,
        }
    }

    /// Attach a session token, sent as `SecurityToken`.
    #[must_use]
    pub fn with_security_token(mut self, token: impl Into<String>) -> Self {
        self.security_token = Some(token.into());
        self
    }

    /// The access key ID (safe to log).
    #[must_use]
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// The access key secret. Only use it to compute signatures.
    #[must_use]
    pub fn access_key_secret(&self) -> &str {
        &self.access_key_secret
    }

    /// The session token, if any.
    #[must_use]
    pub fn security_token(&self) -> Option<&str> {
        self.security_token.as_deref()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"[REDACTED]")
            .field("security_token", &self.security_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Produces the credential for a named client.
pub trait CredentialProvider: Send + Sync + fmt::Debug {
    /// Short provider name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Resolve the credential for `client_name`.
    ///
    /// Returns [`CredentialError::NotConfigured`] when this provider has
    /// nothing to offer, so a chain can try the next one.
    fn provide(&self, client_name: &str) -> Result<Credential, CredentialError>;
}

/// Provider returning one fixed credential for every client.
#[derive(Debug, Clone)]
pub struct StaticCredentialProvider {
    credential: Credential,
}

impl StaticCredentialProvider {
    /// Create a provider for a fixed key pair.
    #[must_use]
    pub fn new(access_key_id: impl Into<String>, access_key_secret: impl Into<String>) -> Self {
        Self {
            credential: Credential::new(access_key_id, access_key_secret),
        }
    }
}

impl From<Credential> for StaticCredentialProvider {
    fn from(credential: Credential) -> Self {
        Self { credential }
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn name(&self) -> &'static str {
        "static"
    }

    fn provide(&self, _client_name: &str) -> Result<Credential, CredentialError> {
        Ok(self.credential.clone())
    }
}

/// Provider reading `ALIBABA_CLOUD_ACCESS_KEY_ID` and
/// `ALIBABA_CLOUD_ACCESS_KEY_SECRET`.
///
/// An unset key ID means "not configured". A key ID that is set but empty,
/// or a missing secret, is an error.
pub struct EnvCredentialProvider {
    lookup: EnvLookup,
}

impl EnvCredentialProvider {
    /// Create a provider reading the process environment.
    #[must_use]
    pub fn new() -> Self {
        Self::with_lookup(process_env())
    }

    /// Create a provider reading from `lookup`.
    #[must_use]
    pub fn with_lookup(lookup: EnvLookup) -> Self {
        Self { lookup }
    }
}

impl Default for EnvCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EnvCredentialProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvCredentialProvider").finish_non_exhaustive()
    }
}

impl CredentialProvider for EnvCredentialProvider {
    fn name(&self) -> &'static str {
        "env"
    }

    fn provide(&self, _client_name: &str) -> Result<Credential, CredentialError> {
        let Some(access_key_id) = (self.lookup)(ENV_ACCESS_KEY_ID) else {
            return Err(CredentialError::NotConfigured {
                provider: self.name(),
            });
        };
        if access_key_id.is_empty() {
            return Err(CredentialError::invalid(
                self.name(),
                format!("environment variable {ENV_ACCESS_KEY_ID} cannot be empty"),
            ));
        }

        let access_key_secret = (self.lookup)(ENV_ACCESS_KEY_SECRET)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                CredentialError::invalid(
                    self.name(),
                    format!("environment variable {ENV_ACCESS_KEY_SECRET} cannot be empty"),
                )
            })?;

        let mut credential = Credential::new(access_key_id, access_key_secret);
        if let Some(token) = (self.lookup)(ENV_SECURITY_TOKEN).filter(|t| !t.is_empty()) {
            credential = credential.with_security_token(token);
        }
        Ok(credential)
    }
}

/// Ordered list of providers; the first one that is configured wins.
///
/// A provider that fails for any reason other than "not configured" stops the
/// chain and its error is returned unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProviderChain {
    providers: Vec<Arc<dyn CredentialProvider>>,
}

impl ProviderChain {
    /// Create a chain from providers in priority order.
    #[must_use]
    pub fn new(providers: Vec<Arc<dyn CredentialProvider>>) -> Self {
        Self { providers }
    }

    /// The standard chain: environment variables, instance metadata, then the
    /// credentials file.
    ///
    /// The instance metadata step is only present when a `fetcher` is given.
    #[must_use]
    pub fn standard(lookup: &EnvLookup, fetcher: Option<Arc<dyn MetadataFetcher>>) -> Self {
        let mut providers: Vec<Arc<dyn CredentialProvider>> =
            vec![Arc::new(EnvCredentialProvider::with_lookup(Arc::clone(lookup)))];
        if let Some(fetcher) = fetcher {
            providers.push(Arc::new(InstanceMetadataProvider::with_lookup(
                Arc::clone(lookup),
                fetcher,
            )));
        }
        providers.push(Arc::new(ProfileCredentialProvider::with_lookup(Arc::clone(
            lookup,
        ))));
        Self { providers }
    }

    /// Append a provider with the lowest priority.
    #[must_use]
    pub fn with(mut self, provider: Arc<dyn CredentialProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Names of the providers, in order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }
}

impl CredentialProvider for ProviderChain {
    fn name(&self) -> &'static str {
        "chain"
    }

    fn provide(&self, client_name: &str) -> Result<Credential, CredentialError> {
        for provider in &self.providers {
            match provider.provide(client_name) {
                Ok(credential) => {
                    debug!(
                        provider = provider.name(),
                        client = client_name,
                        access_key_id = credential.access_key_id(),
                        "Resolved credential"
                    );
                    return Ok(credential);
                }
                Err(e) if e.is_not_configured() => {
                    debug!(
                        provider = provider.name(),
                        client = client_name,
                        "Provider not configured"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(CredentialError::ChainExhausted {
            client: client_name.to_owned(),
            tried: self.names().join(", "),
        })
    }
}
