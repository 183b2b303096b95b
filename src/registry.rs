//! # Store Registry
//!
//! An explicit registry instance mapping host keys to open
//! [`MappedVector`]s. Hosts construct one at adapter initialization and
//! pass it by reference wherever stores are created; there is no
//! process-wide singleton.
//!
//! Opening an existing key is idempotent for the same path and a hard
//! rebind error for a different one. Every other operation on an absent
//! key is [`StoreError::NotOpen`].
//!
//! The registry inherits the store's concurrency contract: the host
//! serializes all operations per key. No locking happens here.

use std::path::Path;

use eyre::Result;
use hashbrown::HashMap;

use crate::error::StoreError;
use crate::store::MappedVector;
use crate::types::ElementType;

/// Keyed collection of open stores.
#[derive(Debug, Default)]
pub struct Registry {
    stores: HashMap<String, MappedVector>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the store under `key`, or re-validates an existing binding.
    /// Returns the element count either way.
    pub fn open(
        &mut self,
        key: &str,
        path: impl AsRef<Path>,
        type_name: &str,
        width: Option<u64>,
        writable: bool,
    ) -> Result<u64> {
        if let Some(existing) = self.stores.get(key) {
            return Ok(existing.reopen_check(path.as_ref())?);
        }

        let ty = ElementType::parse(type_name)?;
        let store = MappedVector::open(path.as_ref(), ty, width, writable)?;
        let count = store.count();
        self.stores.insert(key.to_string(), store);
        Ok(count)
    }

    pub fn get(&self, key: &str) -> Result<&MappedVector, StoreError> {
        self.stores.get(key).ok_or_else(|| StoreError::NotOpen {
            key: key.to_string(),
        })
    }

    pub fn get_mut(&mut self, key: &str) -> Result<&mut MappedVector, StoreError> {
        self.stores.get_mut(key).ok_or_else(|| StoreError::NotOpen {
            key: key.to_string(),
        })
    }

    /// Drops the store under `key`, unmapping and closing its backing file.
    /// Returns whether a store was bound.
    pub fn remove(&mut self, key: &str) -> bool {
        self.stores.remove(key).is_some()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.stores.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    /// Iterates over `(key, store)` bindings, e.g. for replay-log
    /// re-expression of the whole registry.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MappedVector)> {
        self.stores.iter().map(|(k, v)| (k.as_str(), v))
    }
}
