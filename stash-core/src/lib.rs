//! Stash Core
//!
//! This crate provides small observable state stores for front-end
//! applications. It implements:
//!
//! - Stores holding one JSON state object, addressed by id
//! - Deep patching of state with one consolidated change event per patch
//! - Change subscriptions with explicit unsubscribe and disposal
//! - Per-id store caches and registries
//! - A best-effort devtools bridge
//!
//! The crate is designed to be used both as a native Rust library and, with
//! the `python` feature, as a Python extension module via PyO3.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `patch`: the deep-merge routine and key paths
//! - `store`: stores, change events, subscriptions, caches and registries
//! - `devtools`: the devtools sink trait, messages and the global hook
//! - `config`: per-store settings
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use stash_core::{make_store, ChangeKind};
//!
//! let cart = make_store("cart", json!({"items": [], "total": 0})).unwrap();
//! let store = cart.use_store();
//!
//! store.subscribe(|event, state| {
//!     if event.kind == ChangeKind::Patch {
//!         println!("cart is now {state}");
//!     }
//! });
//!
//! store.patch(json!({"items": ["apple"], "total": 3})).unwrap();
//! assert!(store.ptr_eq(&cart.use_store()));
//! ```

pub mod config;
pub mod devtools;
pub mod error;
pub mod patch;
pub mod store;

#[cfg(feature = "python")]
mod python;

pub use config::StoreConfig;
pub use error::{DevtoolsError, Result, StoreError};
pub use store::{
    ChangeEvent, ChangeKind, SlotState, Store, StoreBuilder, StoreCache, StoreRegistry,
    SubscriptionId,
};

use serde_json::Value;

/// Create a store with default settings.
///
/// The store connects to the installed devtools sink, if any. Fails with
/// [`StoreError::InvalidStateShape`] unless `initial_state` is an object.
pub fn create_store(id: impl Into<String>, initial_state: Value) -> Result<Store> {
    StoreBuilder::new(id, initial_state).build()
}

/// Create a lazily-constructed, clearable store slot.
///
/// The initial state is only used when the store is (re)constructed.
pub fn make_store(id: impl Into<String>, initial_state: Value) -> Result<StoreCache> {
    StoreBuilder::new(id, initial_state).cache()
}

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Python module definition.
///
/// This function is called by Python when importing the module.
/// It registers all Python-exposed types.
#[cfg(feature = "python")]
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<python::PyStore>()?;

    // Add version info
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
