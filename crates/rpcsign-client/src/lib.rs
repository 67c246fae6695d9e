//! Client resolution and request signing for RPC-style HTTP APIs.
//!
//! Given a parameter map and a client name, this crate produces the fully
//! authenticated parameter set the remote API expects. It never opens a
//! socket: the caller sends the result over its own transport.
//!
//! # Overview
//!
//! - [`ClientResolver`] maps a client name to a [`ClientHandle`], registering
//!   one through a credential provider chain on first use.
//! - [`signer`] adds `Format`, `SignatureMethod`, `SignatureVersion`,
//!   `SignatureNonce`, `Timestamp`, `AccessKeyId`, `SignatureType`, and
//!   `Signature` to a parameter map.
//! - [`response`] classifies responses and wraps error payloads.
//! - [`RpcClient`] ties the three together for one endpoint.
//!
//! # Usage
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use std::sync::Arc;
//!
//! use rpcsign_auth::Credential;
//! use rpcsign_client::{ClientResolver, RpcClient};
//! use rpcsign_core::{ClientName, ClientRegistry, ResolverConfig, RpcClientConfig};
//!
//! let resolver = ClientResolver::new(Arc::new(ClientRegistry::new()), &ResolverConfig::default())
//!     .unwrap();
//! resolver.register(ClientName::default(), Credential::new("id", "secret"));
//!
//! let client = RpcClient::new(RpcClientConfig::new("example.com"), Arc::new(resolver)).unwrap();
//! let params = BTreeMap::from([("Action".to_owned(), "Describe".to_owned())]);
//! let signed = client.query(params, &http::Method::GET).unwrap();
//! assert!(signed.contains_key("Signature"));
//! ```

mod client;
mod handle;
mod provider;
mod resolver;
pub mod response;
pub mod signer;

pub use client::RpcClient;
pub use handle::ClientHandle;
pub use provider::{ClientProvider, CustomChainProvider, DefaultChainProvider};
pub use resolver::ClientResolver;
pub use response::{ServiceError, has_error, to_error};
pub use signer::{ParameterMap, sign, sign_at};
