//! Messages sent to devtools.

use serde::Serialize;
use serde_json::Value;

use crate::error::DevtoolsError;
use crate::store::ChangeEvent;

/// One message on the devtools channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DevtoolsMessage {
    /// A store was constructed.
    Init { store: String, state: Value },

    /// A store emitted a change event.
    Mutation { event: ChangeEvent, state: Value },
}

impl DevtoolsMessage {
    /// Name of the store this message concerns.
    pub fn store(&self) -> &str {
        match self {
            DevtoolsMessage::Init { store, .. } => store,
            DevtoolsMessage::Mutation { event, .. } => &event.store_name,
        }
    }

    /// Encode as MessagePack, with struct fields as named map keys.
    pub fn encode(&self) -> Result<Vec<u8>, DevtoolsError> {
        Ok(rmp_serde::to_vec_named(self)?)
    }
}
