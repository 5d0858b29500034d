//! Devtools Bridge
//!
//! Stores report to an external inspector through a [`DevtoolsSink`]. The
//! bridge is strictly one-way and best-effort:
//!
//! - a store sends an `Init` message with its state when it is built;
//! - every change event it emits is followed by a `Mutation` message
//!   carrying the event and the resulting state.
//!
//! Sink errors and panics are caught here and logged. They never reach the
//! store or its subscribers.
//!
//! # Global hook
//!
//! Applications usually install one sink for the whole process with
//! [`install`]. Stores built afterwards (through `create_store` or a cache)
//! pick it up automatically; `StoreBuilder::devtools` overrides the hook
//! for a single store.

mod message;
mod sink;

pub use message::DevtoolsMessage;
pub use sink::{DevtoolsSink, MemorySink, WriterSink};

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use serde_json::Value;

use crate::store::ChangeEvent;

type SharedSink = Arc<dyn DevtoolsSink>;

static HOOK: OnceLock<RwLock<Option<SharedSink>>> = OnceLock::new();

fn hook() -> &'static RwLock<Option<SharedSink>> {
    HOOK.get_or_init(|| RwLock::new(None))
}

/// Install the process-wide devtools sink, returning the previous one.
pub fn install(sink: Arc<dyn DevtoolsSink>) -> Option<Arc<dyn DevtoolsSink>> {
    tracing::debug!("devtools hook installed");
    hook().write().replace(sink)
}

/// Remove the process-wide devtools sink.
///
/// Stores that already connected keep their sink.
pub fn uninstall() -> Option<Arc<dyn DevtoolsSink>> {
    hook().write().take()
}

/// The currently installed sink, if any.
pub fn installed() -> Option<Arc<dyn DevtoolsSink>> {
    hook().read().clone()
}

/// Announce a new store.
pub(crate) fn connect(sink: &dyn DevtoolsSink, store: &str, state: &Value) {
    deliver(
        sink,
        &DevtoolsMessage::Init {
            store: store.to_owned(),
            state: state.clone(),
        },
    );
}

/// Forward a change event.
pub(crate) fn record(sink: &dyn DevtoolsSink, event: &ChangeEvent, state: &Value) {
    deliver(
        sink,
        &DevtoolsMessage::Mutation {
            event: event.clone(),
            state: state.clone(),
        },
    );
}

fn deliver(sink: &dyn DevtoolsSink, message: &DevtoolsMessage) {
    match catch_unwind(AssertUnwindSafe(|| sink.send(message))) {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            tracing::warn!(store = message.store(), error = %err, "devtools sink failed");
        }
        Err(_) => {
            tracing::warn!(store = message.store(), "devtools sink panicked");
        }
    }
}
