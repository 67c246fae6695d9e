//! RPC-style query signing for RpcSign.
//!
//! This crate implements both sides of the query-parameter authentication
//! scheme used by RPC-style HTTP APIs: building the canonical string from a
//! parameter map, computing the HMAC signature over it, resolving credentials
//! from the environment, a credentials file, or instance metadata, and
//! verifying a signed query on the receiving end.
//!
//! # Overview
//!
//! A signed request carries every parameter in its query string, including
//! `AccessKeyId`, `Timestamp`, `SignatureNonce`, and finally `Signature`:
//!
//! ```text
//! StringToSign = HTTPMethod + "&" + "%2F" + "&" + PercentEncode(CanonicalQuery)
//! Signature    = Base64(HMAC(AccessKeySecret + "&", StringToSign))
//! ```
//!
//! # Usage
//!
//! ```rust
//! use std::collections::BTreeMap;
//!
//! use rpcsign_auth::signature::{HmacSha1Signature, compute_rpc_signature};
//!
//! let params = BTreeMap::from([("Action".to_owned(), "DescribeRegions".to_owned())]);
//! let signature = compute_rpc_signature(&HmacSha1Signature, "secret", "GET", &params);
//! assert!(!signature.is_empty());
//! ```
//!
//! # Modules
//!
//! - [`canonical`] - Percent-encoding and string-to-sign construction
//! - [`credentials`] - Credential type, provider trait, and provider chain
//! - [`error`] - Authentication and credential error types
//! - [`metadata`] - Instance metadata credential provider
//! - [`profile`] - Credentials-file provider
//! - [`signature`] - HMAC signature algorithms
//! - [`verify`] - Verification of signed queries

pub mod canonical;
pub mod credentials;
pub mod error;
pub mod metadata;
pub mod profile;
pub mod signature;
pub mod verify;

pub use credentials::{
    Credential, CredentialProvider, EnvCredentialProvider, EnvLookup, ProviderChain,
    StaticCredentialProvider,
};
pub use error::{AuthError, CredentialError};
pub use metadata::{InstanceMetadataProvider, MetadataFetcher};
pub use profile::ProfileCredentialProvider;
pub use signature::{
    HmacSha1Signature, HmacSha256Signature, SignatureAlgorithm, SignatureMethod,
    compute_rpc_signature,
};
pub use verify::{AccessKeyStore, StaticAccessKeyStore, VerifiedQuery, verify_rpc_query};
