//! Store construction.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::{Store, StoreCache};
use crate::config::StoreConfig;
use crate::devtools::{self, DevtoolsSink};
use crate::error::{kind_of, Result, StoreError};

/// Where a store's devtools messages go.
#[derive(Clone, Default)]
pub(crate) enum DevtoolsTarget {
    /// Whatever sink is installed globally when the store is built.
    #[default]
    Installed,
    Sink(Arc<dyn DevtoolsSink>),
    Disabled,
}

impl DevtoolsTarget {
    pub(crate) fn resolve(&self, config: &StoreConfig) -> Option<Arc<dyn DevtoolsSink>> {
        if !config.devtools {
            return None;
        }
        match self {
            DevtoolsTarget::Installed => devtools::installed(),
            DevtoolsTarget::Sink(sink) => Some(Arc::clone(sink)),
            DevtoolsTarget::Disabled => None,
        }
    }
}

impl fmt::Debug for DevtoolsTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DevtoolsTarget::Installed => f.write_str("Installed"),
            DevtoolsTarget::Sink(_) => f.write_str("Sink"),
            DevtoolsTarget::Disabled => f.write_str("Disabled"),
        }
    }
}

/// Configures and builds a [`Store`] or a [`StoreCache`].
///
/// ```rust
/// use serde_json::json;
/// use stash_core::{StoreBuilder, StoreConfig};
///
/// let store = StoreBuilder::new("cart", json!({"items": []}))
///     .config(StoreConfig { max_patch_depth: 8, ..StoreConfig::default() })
///     .without_devtools()
///     .build()
///     .unwrap();
/// assert_eq!(store.id(), "cart");
/// ```
#[derive(Debug, Clone)]
pub struct StoreBuilder {
    id: String,
    initial: Value,
    config: StoreConfig,
    devtools: DevtoolsTarget,
}

impl StoreBuilder {
    pub fn new(id: impl Into<String>, initial_state: Value) -> Self {
        Self {
            id: id.into(),
            initial: initial_state,
            config: StoreConfig::default(),
            devtools: DevtoolsTarget::default(),
        }
    }

    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Send devtools traffic to `sink` instead of the installed hook.
    pub fn devtools(mut self, sink: Arc<dyn DevtoolsSink>) -> Self {
        self.devtools = DevtoolsTarget::Sink(sink);
        self
    }

    /// Never connect this store to devtools.
    pub fn without_devtools(mut self) -> Self {
        self.devtools = DevtoolsTarget::Disabled;
        self
    }

    /// Build the store.
    ///
    /// Fails with [`StoreError::InvalidStateShape`] unless the initial state
    /// is an object, and with [`StoreError::InvalidConfig`] on a zero limit.
    pub fn build(self) -> Result<Store> {
        self.config.validate()?;
        let state = into_object(&self.id, self.initial)?;
        let sink = self.devtools.resolve(&self.config);
        Ok(Store::construct(self.id, state, self.config, sink))
    }

    /// Build a lazily-constructed, clearable store slot instead of a store.
    ///
    /// The initial state is validated now and reused for every construction.
    pub fn cache(self) -> Result<StoreCache> {
        self.config.validate()?;
        let state = into_object(&self.id, self.initial)?;
        Ok(StoreCache::new(self.id, state, self.config, self.devtools))
    }
}

fn into_object(id: &str, value: Value) -> Result<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::InvalidStateShape {
            id: id.to_owned(),
            found: kind_of(&other),
        }),
    }
}
