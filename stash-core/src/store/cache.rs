//! Store Cache
//!
//! A clearable, lazily-filled slot holding at most one store.
//!
//! ```text
//! Empty --use_store()--> Constructed
//! Constructed --use_store()--> Constructed   (same instance)
//! Constructed --clear()--> Empty
//! ```
//!
//! The initial state is captured when the cache is made and every
//! construction starts from it, so a store built after `clear` does not
//! inherit changes made to the one before.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Map, Value};

use super::builder::DevtoolsTarget;
use super::Store;
use crate::config::StoreConfig;

/// State of a [`StoreCache`] slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Empty,
    Constructed,
}

/// Per-id store singleton, see the module docs.
#[derive(Debug)]
pub struct StoreCache {
    id: String,
    initial: Arc<Map<String, Value>>,
    config: StoreConfig,
    devtools: DevtoolsTarget,
    slot: Mutex<Option<Store>>,
}

impl StoreCache {
    pub(crate) fn new(
        id: String,
        initial: Map<String, Value>,
        config: StoreConfig,
        devtools: DevtoolsTarget,
    ) -> Self {
        Self {
            id,
            initial: Arc::new(initial),
            config,
            devtools,
            slot: Mutex::new(None),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Return the cached store, constructing it on first use.
    pub fn use_store(&self) -> Store {
        let mut slot = self.slot.lock();
        if let Some(store) = slot.as_ref() {
            return store.clone();
        }

        let store = Store::construct(
            self.id.clone(),
            Map::clone(&self.initial),
            self.config.clone(),
            self.devtools.resolve(&self.config),
        );
        *slot = Some(store.clone());
        store
    }

    /// Drop the cached store.
    ///
    /// Handles already given out keep working; they are simply no longer
    /// what `use_store` returns. Their subscribers are left in place.
    pub fn clear(&self) {
        if self.slot.lock().take().is_some() {
            tracing::debug!(store = %self.id, "cache cleared");
        }
    }

    pub fn slot_state(&self) -> SlotState {
        if self.slot.lock().is_some() {
            SlotState::Constructed
        } else {
            SlotState::Empty
        }
    }

    pub fn is_constructed(&self) -> bool {
        self.slot_state() == SlotState::Constructed
    }
}
