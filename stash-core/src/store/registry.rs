//! A scope of store caches keyed by id.
//!
//! Within one registry there is at most one store per id. Separate
//! registries are independent, so tests or embedded apps can each keep
//! their own.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;

use super::{Store, StoreBuilder, StoreCache};
use crate::error::{Result, StoreError};

#[derive(Debug, Default)]
pub struct StoreRegistry {
    caches: DashMap<String, Arc<StoreCache>>,
}

impl StoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a store with default settings.
    pub fn define(&self, id: impl Into<String>, initial_state: Value) -> Result<Arc<StoreCache>> {
        self.define_with(StoreBuilder::new(id, initial_state))
    }

    /// Define a store from a configured builder.
    ///
    /// Fails with [`StoreError::DuplicateStore`] if the id is taken.
    pub fn define_with(&self, builder: StoreBuilder) -> Result<Arc<StoreCache>> {
        let cache = Arc::new(builder.cache()?);
        match self.caches.entry(cache.id().to_owned()) {
            Entry::Occupied(entry) => Err(StoreError::DuplicateStore(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(Arc::clone(&cache));
                Ok(cache)
            }
        }
    }

    /// The store for `id`, constructed on first use.
    pub fn use_store(&self, id: &str) -> Result<Store> {
        // Release the map shard before constructing.
        let cache = self.cache(id)?;
        Ok(cache.use_store())
    }

    pub fn cache(&self, id: &str) -> Result<Arc<StoreCache>> {
        self.caches
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| StoreError::UnknownStore(id.to_owned()))
    }

    /// Drop the cached store for `id`, keeping its definition.
    pub fn clear(&self, id: &str) -> Result<()> {
        self.cache(id)?.clear();
        Ok(())
    }

    /// Drop every cached store, keeping all definitions.
    pub fn clear_all(&self) {
        for entry in self.caches.iter() {
            entry.value().clear();
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.caches.contains_key(id)
    }

    /// Defined ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.caches.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.caches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.caches.is_empty()
    }
}
