// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Thread-safe name-keyed registry.
//!
//! Backs the type-support registry: many readers (one per deserializer call)
//! and occasional writers (registering definitions found in a bag).

use super::error::{BridgeError, Result};
use std::collections::HashMap;
use std::sync::RwLock;

/// Thread-safe registry for values keyed by type name.
///
/// Uses RwLock for concurrent read access with exclusive write access.
pub struct TypeRegistry<T> {
    inner: RwLock<HashMap<String, T>>,
}

fn poisoned<E: std::fmt::Display>(e: E) -> BridgeError {
    BridgeError::Other(format!("Registry lock poisoned: {e}"))
}

impl<T> TypeRegistry<T> {
    /// Create a new empty type registry.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Register a value, replacing any previous entry with the same name.
    pub fn register(&self, name: impl Into<String>, value: T) -> Result<()> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        inner.insert(name.into(), value);
        Ok(())
    }

    /// Register a value only if the name is not taken yet.
    ///
    /// Returns `true` when the value was inserted.
    pub fn register_if_absent(&self, name: impl Into<String>, value: T) -> Result<bool> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        let name = name.into();
        if inner.contains_key(&name) {
            return Ok(false);
        }
        inner.insert(name, value);
        Ok(true)
    }

    /// Get a value by name.
    pub fn get(&self, name: &str) -> Result<Option<T>>
    where
        T: Clone,
    {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.get(name).cloned())
    }

    /// Check if a name is registered.
    pub fn contains(&self, name: &str) -> Result<bool> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.contains_key(name))
    }

    /// Get all registered names, sorted.
    pub fn names(&self) -> Result<Vec<String>> {
        let inner = self.inner.read().map_err(poisoned)?;
        let mut names: Vec<String> = inner.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    /// Get the number of registered values.
    pub fn len(&self) -> Result<usize> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.len())
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl<T> Default for TypeRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
