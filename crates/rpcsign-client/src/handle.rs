//! Resolved client handles.

use std::sync::Arc;

use rpcsign_auth::{Credential, SignatureAlgorithm, SignatureMethod};
use rpcsign_core::ClientName;

/// A named credential bound to a signature algorithm.
///
/// Handles are created once per name by the
/// [`ClientResolver`](crate::ClientResolver), shared through the registry,
/// and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    name: ClientName,
    credential: Credential,
    algorithm: Arc<dyn SignatureAlgorithm>,
}

impl ClientHandle {
    /// Create a handle with an explicit algorithm.
    #[must_use]
    pub fn new(
        name: ClientName,
        credential: Credential,
        algorithm: Arc<dyn SignatureAlgorithm>,
    ) -> Self {
        Self {
            name,
            credential,
            algorithm,
        }
    }

    /// Create a handle signing with `method`.
    #[must_use]
    pub fn with_method(name: ClientName, credential: Credential, method: SignatureMethod) -> Self {
        Self::new(name, credential, method.algorithm())
    }

    /// The client name.
    #[must_use]
    pub fn name(&self) -> &ClientName {
        &self.name
    }

    /// The credential used to sign.
    #[must_use]
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// The signature algorithm.
    #[must_use]
    pub fn algorithm(&self) -> &dyn SignatureAlgorithm {
        self.algorithm.as_ref()
    }

    /// Value of `SignatureMethod`.
    #[must_use]
    pub fn signature_method(&self) -> &'static str {
        self.algorithm.method()
    }

    /// Value of `SignatureVersion`.
    #[must_use]
    pub fn signature_version(&self) -> &'static str {
        self.algorithm.version()
    }

    /// Value of `SignatureType`.
    #[must_use]
    pub fn signature_type(&self) -> &'static str {
        self.algorithm.signature_type()
    }
}
