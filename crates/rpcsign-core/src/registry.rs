//! Named client registry.
//!
//! Provides [`ClientRegistry`], a thread-safe concurrent map from
//! [`ClientName`] to a shared client value. The registry is an ordinary value
//! owned by the application and handed to whoever resolves clients, so tests
//! and independent components can each hold their own.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::types::ClientName;

/// Thread-safe registry of named clients.
///
/// Each name maps to exactly one `Arc<T>`. Uses `DashMap` for concurrent
/// access. First-use registration serializes on a per-name lock held outside
/// the map, so callers racing on the same name converge on a single value
/// while lookups of other names proceed.
///
/// # Examples
///
/// ```
/// use rpcsign_core::{ClientName, ClientRegistry};
///
/// let registry = ClientRegistry::<String>::new();
/// let name = ClientName::default();
/// let value = registry
///     .get_or_try_insert_with(&name, || Ok::<_, ()>("handle".to_owned()))
///     .unwrap();
/// assert_eq!(value.as_str(), "handle");
/// assert!(registry.has(&name));
/// ```
#[derive(Debug)]
pub struct ClientRegistry<T: Send + Sync> {
    inner: DashMap<ClientName, Arc<T>>,
    pending: DashMap<ClientName, Arc<Mutex<()>>>,
}

impl<T: Send + Sync> ClientRegistry<T> {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: DashMap::new(),
            pending: DashMap::new(),
        }
    }

    /// Whether a client is registered under `name`.
    #[must_use]
    pub fn has(&self, name: &ClientName) -> bool {
        self.inner.contains_key(name)
    }

    /// Get the client registered under `name`, if any.
    #[must_use]
    pub fn get(&self, name: &ClientName) -> Option<Arc<T>> {
        self.inner.get(name).map(|v| v.clone())
    }

    /// Register `value` under `name`, replacing any existing client, and
    /// return the shared value.
    pub fn insert(&self, name: ClientName, value: T) -> Arc<T> {
        let value = Arc::new(value);
        self.inner.insert(name, Arc::clone(&value));
        value
    }

    /// Get the client for `name`, building and registering it if absent.
    ///
    /// `init` runs at most once per name while it succeeds: a concurrent
    /// caller for the same name waits on that name's lock and then observes
    /// the registered value. No map lock is held while `init` runs, so it may
    /// block and may consult the registry for other names. If `init` fails
    /// nothing is registered and the next caller runs its own `init`.
    pub fn get_or_try_insert_with<E>(
        &self,
        name: &ClientName,
        init: impl FnOnce() -> Result<T, E>,
    ) -> Result<Arc<T>, E> {
        if let Some(value) = self.get(name) {
            return Ok(value);
        }

        let lock = Arc::clone(self.pending.entry(name.clone()).or_default().value());
        let _guard = lock.lock();

        if let Some(value) = self.get(name) {
            return Ok(value);
        }

        let value = Arc::new(init()?);
        self.inner.insert(name.clone(), Arc::clone(&value));
        self.pending.remove_if(name, |_, pending| Arc::ptr_eq(pending, &lock));
        Ok(value)
    }

    /// Remove the client registered under `name`.
    pub fn remove(&self, name: &ClientName) -> Option<Arc<T>> {
        self.inner.remove(name).map(|(_, v)| v)
    }

    /// Names of all registered clients, sorted.
    #[must_use]
    pub fn list_all(&self) -> Vec<ClientName> {
        let mut names: Vec<ClientName> = self.inner.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Remove every registered client.
    pub fn reset(&self) {
        self.inner.clear();
        self.pending.clear();
    }

    /// Number of registered clients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether no client is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<T: Send + Sync> Default for ClientRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
