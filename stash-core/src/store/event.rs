//! Change events delivered to subscribers.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::patch::KeyPath;

/// What kind of operation produced a change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    /// The state was mutated directly through `Store::mutate`.
    #[serde(rename = "in place")]
    InPlace,

    /// A partial object was deep-merged with `Store::patch`.
    #[serde(rename = "patch")]
    Patch,

    /// The whole state was swapped by `Store::replace_and_notify`.
    #[serde(rename = "replace")]
    Replace,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::InPlace => "in place",
            ChangeKind::Patch => "patch",
            ChangeKind::Replace => "replace",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single notification emitted by a store.
///
/// Serializes as `{"storeName", "type", "payload"}`, plus `paths` when a
/// patch overwrote any values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeEvent {
    #[serde(rename = "storeName")]
    pub store_name: String,

    #[serde(rename = "type")]
    pub kind: ChangeKind,

    /// `{}` for in-place mutations, the raw partial for patches, and the
    /// new state for replacements.
    pub payload: Value,

    /// Leaf paths written by a patch, in merge order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<KeyPath>,
}

impl ChangeEvent {
    pub fn in_place(store_name: impl Into<String>) -> Self {
        Self {
            store_name: store_name.into(),
            kind: ChangeKind::InPlace,
            payload: Value::Object(Map::new()),
            paths: Vec::new(),
        }
    }

    pub fn patch(store_name: impl Into<String>, payload: Value, paths: Vec<KeyPath>) -> Self {
        Self {
            store_name: store_name.into(),
            kind: ChangeKind::Patch,
            payload,
            paths,
        }
    }

    pub fn replace(store_name: impl Into<String>, payload: Value) -> Self {
        Self {
            store_name: store_name.into(),
            kind: ChangeKind::Replace,
            payload,
            paths: Vec::new(),
        }
    }
}
