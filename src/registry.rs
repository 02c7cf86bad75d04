//! Generic provider registry
//!
//! A thread-safe map from a kind key to a registered implementation. Three
//! independently-keyed registries exist in the system (provider by store
//! type, provider by manifest kind, manifest prototype by kind) with
//! identical semantics and different payload types; they share this one
//! generic design.
//!
//! Mutation is protected by a single reader/writer lock per registry, held
//! only for the duration of the map operation and never across I/O.
//! Registration normally happens single-threaded at process start;
//! [`Registry::force_register`] is the only writer expected to race with
//! lookups, and only in test harnesses.

use crate::errors::{KeyplaneError, Result};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::RwLock;
use tracing::error;

/// Thread-safe kind-to-implementation table
pub struct Registry<K, V> {
    entries: RwLock<HashMap<K, V>>,
}

impl<K, V> fmt::Debug for Registry<K, V>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.entries.read() {
            Ok(entries) => {
                f.debug_struct("Registry").field("kinds", &entries.keys().collect::<Vec<_>>()).finish()
            }
            Err(_) => f.debug_struct("Registry").field("kinds", &"<poisoned>").finish(),
        }
    }
}

impl<K, V> Default for Registry<K, V> {
    fn default() -> Self {
        Self { entries: RwLock::new(HashMap::new()) }
    }
}

impl<K, V> Registry<K, V>
where
    K: Eq + Hash + Clone + fmt::Display,
    V: Clone,
{
    /// Create an empty registry
    pub fn new() -> Self {
        Self { entries: RwLock::new(HashMap::new()) }
    }

    /// Register an implementation for a kind.
    ///
    /// A duplicate kind is a startup misconfiguration, never a runtime
    /// condition to recover from; the error is meant to be aggregated and
    /// surfaced to the process entry point.
    pub fn register(&self, kind: K, value: V) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| KeyplaneError::internal("registry lock poisoned during register"))?;
        if entries.contains_key(&kind) {
            return Err(KeyplaneError::already_registered(kind.to_string()));
        }
        entries.insert(kind, value);
        Ok(())
    }

    /// Register unconditionally, overwriting any existing entry.
    ///
    /// Reserved for test harnesses; normal startup paths use
    /// [`Registry::register`].
    pub fn force_register(&self, kind: K, value: V) {
        match self.entries.write() {
            Ok(mut entries) => {
                entries.insert(kind, value);
            }
            Err(_) => {
                error!("registry lock poisoned - dropping force_register");
            }
        }
    }

    /// Look up the implementation registered for a kind.
    ///
    /// Reads share the lock; a lookup observes a fully-inserted entry or
    /// none. On a poisoned lock the registry fails closed and reports
    /// not-found.
    pub fn lookup(&self, kind: &K) -> Option<V> {
        let entries = match self.entries.read() {
            Ok(guard) => guard,
            Err(_) => {
                error!("registry lock poisoned - treating lookup as not found");
                return None;
            }
        };
        entries.get(kind).cloned()
    }

    /// Check whether a kind is registered
    pub fn contains(&self, kind: &K) -> bool {
        self.lookup(kind).is_some()
    }

    /// List the registered kinds
    pub fn registered_kinds(&self) -> Vec<K> {
        match self.entries.read() {
            Ok(entries) => entries.keys().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Number of registered kinds
    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Whether the registry holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
