//! Core types, configuration, and client registry for RpcSign.
//!
//! This crate holds the pieces shared by the signing and client crates: the
//! error taxonomy surfaced to callers, environment-driven configuration, the
//! [`ClientName`] key type, and [`ClientRegistry`], the injectable replacement
//! for a process-wide table of named clients.

mod config;
mod error;
mod registry;
mod types;

pub use config::{ResolverConfig, RpcClientConfig};
pub use error::{RpcError, RpcResult};
pub use registry::ClientRegistry;
pub use types::ClientName;
