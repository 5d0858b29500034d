//! Store Implementation
//!
//! A Store is a named container for one state object. Every change goes
//! through a store method, and every notifying method delivers exactly one
//! event to the subscribers once the change is complete.
//!
//! # How Changes Flow
//!
//! 1. The method takes the state write lock and applies its change. No
//!    subscriber can observe the state mid-change.
//!
//! 2. The lock is released.
//!
//! 3. Subscribers run in registration order with the event and a snapshot
//!    of the current state, followed by the devtools sink if one is
//!    connected.
//!
//! Because mutation and notification are separate phases, a bulk change
//! such as a deep patch yields one consolidated event rather than one per
//! field written.
//!
//! # Re-entrancy
//!
//! No lock is held while subscribers run, so a subscriber may patch the
//! store it is observing. Such nested dispatches are bounded by
//! `StoreConfig::max_dispatch_depth`; events past the bound are dropped and
//! logged instead of recursing without end. Each subscriber is handed the
//! state as it is when that subscriber runs, including changes made by
//! subscribers before it.
//!
//! A `mutate` closure is the exception: it runs under the write lock and
//! must only use the map it is given. Reaching back into the same store
//! from inside it panics.
//!
//! # Snapshots
//!
//! State is held behind an `Arc`. Readers get a cheap clone of that `Arc`;
//! writers copy the tree only while an older snapshot is still alive.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};

use super::context::{DispatchContext, StoreKey, WriteContext};
use super::subscription::{Callback, SubscriptionId, Subscriptions};
use super::ChangeEvent;
use crate::config::StoreConfig;
use crate::devtools::{self, DevtoolsSink};
use crate::error::{kind_of, Result, StoreError};
use crate::patch::{self, KeyPath};

/// A named, observable state container.
///
/// `Store` is a handle: clones share the same state and subscribers.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use stash_core::create_store;
///
/// let store = create_store("main", json!({"user": {"name": "Ada", "age": 36}})).unwrap();
///
/// store.subscribe(|event, state| {
///     println!("{} -> {}", event.kind, state);
/// });
///
/// store.patch(json!({"user": {"age": 37}})).unwrap();
/// assert_eq!(store.state()["user"], json!({"name": "Ada", "age": 37}));
/// ```
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    id: String,
    key: StoreKey,
    /// Always holds a `Value::Object`.
    state: RwLock<Arc<Value>>,
    subscriptions: RwLock<Subscriptions>,
    config: StoreConfig,
    devtools: Option<Arc<dyn DevtoolsSink>>,
}

impl Store {
    /// Build a store from already-validated parts and connect devtools.
    pub(crate) fn construct(
        id: String,
        state: Map<String, Value>,
        config: StoreConfig,
        devtools: Option<Arc<dyn DevtoolsSink>>,
    ) -> Self {
        let store = Self {
            inner: Arc::new(StoreInner {
                id,
                key: StoreKey::new(),
                state: RwLock::new(Arc::new(Value::Object(state))),
                subscriptions: RwLock::new(Subscriptions::default()),
                config,
                devtools,
            }),
        };

        tracing::debug!(
            store = %store.inner.id,
            devtools = store.inner.devtools.is_some(),
            "store created"
        );

        if let Some(sink) = &store.inner.devtools {
            devtools::connect(sink.as_ref(), &store.inner.id, &store.state());
        }

        store
    }

    /// The store's identifier.
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Whether two handles refer to the same store instance.
    pub fn ptr_eq(&self, other: &Store) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Snapshot of the current state.
    ///
    /// Each call observes the latest committed value. The returned snapshot
    /// itself does not change when the store is updated later.
    pub fn state(&self) -> Arc<Value> {
        self.assert_not_writing();
        Arc::clone(&*self.inner.state.read())
    }

    /// Run `f` against the current state.
    pub fn with_state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Value) -> R,
    {
        f(self.state().as_ref())
    }

    /// Read one value by JSON pointer, e.g. `/user/name`.
    pub fn get(&self, pointer: &str) -> Option<Value> {
        self.assert_not_writing();
        self.inner.state.read().pointer(pointer).cloned()
    }

    /// Mutate the state directly, then notify with an `"in place"` event.
    ///
    /// One event is emitted per call, however many fields `f` touches.
    ///
    /// # Panics
    ///
    /// `f` runs with the state write-locked. Reading or writing this store
    /// from inside `f`, through any handle, panics instead of deadlocking;
    /// use the map passed to `f`.
    pub fn mutate<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Map<String, Value>) -> R,
    {
        let result = self.write(f);
        self.emit(ChangeEvent::in_place(self.id()));
        result
    }

    /// Deep-merge `partial` into the state, then notify with one `"patch"`
    /// event whose payload is `partial`.
    ///
    /// The patch is validated before anything is written: a non-object
    /// partial or one nested beyond `max_patch_depth` leaves the state
    /// untouched and emits nothing.
    pub fn patch(&self, partial: Value) -> Result<()> {
        let Value::Object(fields) = &partial else {
            return Err(StoreError::InvalidPatch {
                id: self.inner.id.clone(),
                found: kind_of(&partial),
            });
        };
        patch::check_depth(fields, self.inner.config.max_patch_depth)?;

        let mut paths: Vec<KeyPath> = Vec::new();
        self.write(|state| {
            patch::merge_tracked(state, fields, &mut paths);
        });

        tracing::debug!(store = %self.inner.id, paths = paths.len(), "state patched");
        self.emit(ChangeEvent::patch(self.id(), partial, paths));
        Ok(())
    }

    /// Replace the whole state without notifying subscribers.
    ///
    /// Subscribers are not told about the replacement; the next event they
    /// receive will carry the new state. Use [`Store::replace_and_notify`]
    /// when they should hear about it.
    pub fn replace_state(&self, new_state: Value) -> Result<()> {
        let state = self.expect_object(new_state)?;
        self.write(|current| *current = state);
        tracing::debug!(store = %self.inner.id, "state replaced silently");
        Ok(())
    }

    /// Replace the whole state and notify with one `"replace"` event whose
    /// payload is the new state.
    pub fn replace_and_notify(&self, new_state: Value) -> Result<()> {
        let state = self.expect_object(new_state)?;
        let payload = Value::Object(state.clone());
        self.write(|current| *current = state);
        self.emit(ChangeEvent::replace(self.id(), payload));
        Ok(())
    }

    /// Register a callback for every subsequent change event.
    ///
    /// Callbacks run synchronously, in registration order. A callback added
    /// while an event is being delivered first hears the next event.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ChangeEvent, &Value) + Send + Sync + 'static,
    {
        let callback: Callback = Arc::new(callback);
        let mut subscriptions = self.inner.subscriptions.write();
        let id = subscriptions.insert(callback);
        tracing::debug!(
            store = %self.inner.id,
            subscription = %id,
            subscribers = subscriptions.len(),
            "subscribed"
        );
        id
    }

    /// Remove a subscription. Returns `false` if it was not registered here.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.subscriptions.write().remove(id)
    }

    /// Remove every subscription, returning how many were dropped.
    ///
    /// The state is kept and the store remains usable.
    pub fn dispose(&self) -> usize {
        let dropped = self.inner.subscriptions.write().clear();
        tracing::debug!(store = %self.inner.id, dropped, "subscriptions disposed");
        dropped
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscriptions.read().len()
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn expect_object(&self, value: Value) -> Result<Map<String, Value>> {
        match value {
            Value::Object(map) => Ok(map),
            other => Err(StoreError::InvalidStateShape {
                id: self.inner.id.clone(),
                found: kind_of(&other),
            }),
        }
    }

    fn assert_not_writing(&self) {
        if WriteContext::is_writing(self.inner.key) {
            panic!(
                "store `{}` accessed from inside its own `mutate` closure; \
                 use the map passed to the closure instead",
                self.inner.id
            );
        }
    }

    /// Apply `f` to the state under the write lock, without notifying.
    fn write<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Map<String, Value>) -> R,
    {
        self.assert_not_writing();
        let mut guard = self.inner.state.write();
        let _writing = WriteContext::enter(self.inner.key);
        match Arc::make_mut(&mut *guard) {
            Value::Object(map) => f(map),
            _ => unreachable!("store state is always an object"),
        }
    }

    /// Deliver `event` to every subscriber, then to devtools.
    fn emit(&self, event: ChangeEvent) {
        let key = self.inner.key;
        let depth = DispatchContext::depth(key);
        if depth >= self.inner.config.max_dispatch_depth {
            tracing::error!(
                store = %self.inner.id,
                kind = %event.kind,
                depth,
                "dispatch depth exceeded, dropping event"
            );
            return;
        }
        let _ctx = DispatchContext::enter(key);

        let callbacks = self.inner.subscriptions.read().snapshot();

        for (id, callback) in callbacks {
            // Earlier subscribers may have changed the state again.
            let state = self.state();
            let delivered = catch_unwind(AssertUnwindSafe(|| callback(&event, state.as_ref())));
            if delivered.is_err() {
                tracing::error!(
                    store = %self.inner.id,
                    subscription = %id,
                    kind = %event.kind,
                    "subscriber panicked"
                );
            }
        }

        if let Some(sink) = &self.inner.devtools {
            devtools::record(sink.as_ref(), &event, &self.state());
        }
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("id", &self.inner.id)
            .field("state", &self.state())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
