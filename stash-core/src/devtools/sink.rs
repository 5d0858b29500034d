//! Devtools sinks.
//!
//! A sink is the far end of the devtools bridge. It receives every
//! [`DevtoolsMessage`] for the stores connected to it and must not block
//! for long: stores call it synchronously from their mutation path.

use std::io::Write;

use parking_lot::Mutex;

use super::DevtoolsMessage;
use crate::error::DevtoolsError;

/// Receiver for devtools traffic.
///
/// Errors returned here are logged by the bridge and otherwise ignored.
pub trait DevtoolsSink: Send + Sync {
    fn send(&self, message: &DevtoolsMessage) -> Result<(), DevtoolsError>;
}

/// Keeps every message in memory, for inspection and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    messages: Mutex<Vec<DevtoolsMessage>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages received so far.
    pub fn messages(&self) -> Vec<DevtoolsMessage> {
        self.messages.lock().clone()
    }

    /// Messages concerning the named store.
    pub fn messages_for(&self, store: &str) -> Vec<DevtoolsMessage> {
        self.messages
            .lock()
            .iter()
            .filter(|message| message.store() == store)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }
}

impl DevtoolsSink for MemorySink {
    fn send(&self, message: &DevtoolsMessage) -> Result<(), DevtoolsError> {
        self.messages.lock().push(message.clone());
        Ok(())
    }
}

/// Writes MessagePack frames to any writer.
///
/// Each frame is a big-endian `u32` length followed by the encoded message.
/// Pointing this at a pipe or socket is enough for an external inspector.
pub struct WriterSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> DevtoolsSink for WriterSink<W> {
    fn send(&self, message: &DevtoolsMessage) -> Result<(), DevtoolsError> {
        let frame = message.encode()?;
        let len = u32::try_from(frame.len())
            .map_err(|_| DevtoolsError::Rejected(format!("frame of {} bytes", frame.len())))?;

        let mut writer = self.writer.lock();
        writer.write_all(&len.to_be_bytes())?;
        writer.write_all(&frame)?;
        writer.flush()?;
        Ok(())
    }
}
