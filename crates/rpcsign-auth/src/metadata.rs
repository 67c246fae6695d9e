//! Instance metadata credential provider.
//!
//! Compute instances with an attached RAM role expose temporary credentials
//! under the metadata service path
//! `/latest/meta-data/ram/security-credentials/<role>`. The role name comes
//! from `ALIBABA_CLOUD_ECS_METADATA`; without it the provider reports that it
//! is not configured.
//!
//! The HTTP call itself goes through a [`MetadataFetcher`] supplied by the
//! application, which owns the transport.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::credentials::{Credential, CredentialProvider, EnvLookup, process_env};
use crate::error::CredentialError;

/// Environment variable naming the instance role.
pub const ENV_ECS_METADATA: &str = "ALIBABA_CLOUD_ECS_METADATA";

/// Metadata path prefix for role credentials.
const CREDENTIALS_PATH: &str = "/latest/meta-data/ram/security-credentials/";

const PROVIDER: &str = "instance-metadata";

/// Transport used to read a metadata document.
pub trait MetadataFetcher: Send + Sync + fmt::Debug {
    /// Fetch the body of the document at `path` on the metadata service.
    fn fetch(&self, path: &str) -> Result<String, CredentialError>;
}

/// Credential document returned by the metadata service.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MetadataCredentials {
    code: String,
    access_key_id: String,
    access_key_secret: String,
    security_token: Option<String>,
    expiration: Option<String>,
}

/// Provider reading role credentials from the instance metadata service.
pub struct InstanceMetadataProvider {
    lookup: EnvLookup,
    fetcher: Arc<dyn MetadataFetcher>,
}

impl InstanceMetadataProvider {
    /// Create a provider reading the role name from the process environment.
    #[must_use]
    pub fn new(fetcher: Arc<dyn MetadataFetcher>) -> Self {
        Self::with_lookup(process_env(), fetcher)
    }

    /// Create a provider reading the role name from `lookup`.
    #[must_use]
    pub fn with_lookup(lookup: EnvLookup, fetcher: Arc<dyn MetadataFetcher>) -> Self {
        Self { lookup, fetcher }
    }

    fn parse(body: &str, now: DateTime<Utc>) -> Result<Credential, CredentialError> {
        let doc: MetadataCredentials = serde_json::from_str(body).map_err(|e| {
            CredentialError::invalid(PROVIDER, format!("invalid credential document: {e}"))
        })?;

        if doc.code != "Success" {
            return Err(CredentialError::invalid(
                PROVIDER,
                format!("metadata service returned code {}", doc.code),
            ));
        }
        if doc.access_key_id.is_empty() || doc.access_key_secret.is_empty() {
            return Err(CredentialError::invalid(
                PROVIDER,
                "credential document has an empty access key",
            ));
        }
        if let Some(expiration) = doc.expiration.as_deref() {
            let expires_at = DateTime::parse_from_rfc3339(expiration).map_err(|e| {
                CredentialError::invalid(PROVIDER, format!("invalid expiration {expiration}: {e}"))
            })?;
            if expires_at <= now {
                return Err(CredentialError::invalid(
                    PROVIDER,
                    format!("credential expired at {expiration}"),
                ));
            }
        }

        let mut credential = Credential::new(doc.access_key_id, doc.access_key_secret);
        if let Some(token) = doc.security_token.filter(|t| !t.is_empty()) {
            credential = credential.with_security_token(token);
        }
        Ok(credential)
    }
}

impl fmt::Debug for InstanceMetadataProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceMetadataProvider")
            .field("fetcher", &self.fetcher)
            .finish_non_exhaustive()
    }
}

impl CredentialProvider for InstanceMetadataProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn provide(&self, _client_name: &str) -> Result<Credential, CredentialError> {
        let Some(role) = (self.lookup)(ENV_ECS_METADATA).filter(|r| !r.is_empty()) else {
            return Err(CredentialError::NotConfigured { provider: PROVIDER });
        };

        let path = format!("{CREDENTIALS_PATH}{role}");
        debug!(role = %role, path = %path, "Fetching instance role credentials");

        let body = self.fetcher.fetch(&path)?;
        Self::parse(&body, Utc::now())
    }
}
