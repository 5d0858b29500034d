//! Subscription bookkeeping.
//!
//! A subscription is a callback invoked with every change event a store
//! emits. Callbacks run in registration order; registering the same
//! closure twice yields two independent subscriptions.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use super::ChangeEvent;

/// A change callback, shared so dispatch can run without holding the list.
pub type Callback = Arc<dyn Fn(&ChangeEvent, &Value) + Send + Sync>;

/// Handle returned by `Store::subscribe`, used to unsubscribe.
///
/// Ids are unique across every store in the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Generate a new unique subscription ID.
    ///
    /// Only `Store::subscribe` issues IDs.
    pub(crate) fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Rebuild an ID from its raw value, for IDs that crossed a language
    /// boundary as integers.
    #[cfg_attr(not(feature = "python"), allow(dead_code))]
    pub(crate) fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

/// Ordered set of callbacks keyed by subscription ID.
#[derive(Default)]
pub(crate) struct Subscriptions {
    entries: IndexMap<SubscriptionId, Callback>,
}

impl Subscriptions {
    pub(crate) fn insert(&mut self, callback: Callback) -> SubscriptionId {
        let id = SubscriptionId::new();
        self.entries.insert(id, callback);
        id
    }

    /// Remove a subscription, keeping the order of the rest.
    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        self.entries.shift_remove(&id).is_some()
    }

    /// Drop every subscription, returning how many there were.
    pub(crate) fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Copy out the callbacks in registration order.
    ///
    /// Dispatch iterates the copy so callbacks may subscribe or unsubscribe
    /// while an event is being delivered.
    pub(crate) fn snapshot(&self) -> Vec<(SubscriptionId, Callback)> {
        self.entries
            .iter()
            .map(|(id, callback)| (*id, Arc::clone(callback)))
            .collect()
    }
}

impl fmt::Debug for Subscriptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recording(log: &Arc<Mutex<Vec<&'static str>>>, name: &'static str) -> Callback {
        let log = Arc::clone(log);
        Arc::new(move |_, _| log.lock().unwrap().push(name))
    }

    #[test]
    fn subscription_ids_are_unique() {
        let id1 = SubscriptionId::new();
        let id2 = SubscriptionId::new();
        let id3 = SubscriptionId::new();

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_ne!(id1, id3);
    }

    #[test]
    fn snapshot_preserves_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut subs = Subscriptions::default();
        subs.insert(recording(&log, "first"));
        let middle = subs.insert(recording(&log, "second"));
        subs.insert(recording(&log, "third"));

        assert!(subs.remove(middle));

        let event = ChangeEvent::in_place("test");
        for (_, callback) in subs.snapshot() {
            callback(&event, &Value::Null);
        }
        assert_eq!(*log.lock().unwrap(), vec!["first", "third"]);
    }

    #[test]
    fn raw_value_round_trips() {
        let id = SubscriptionId::new();
        assert_eq!(SubscriptionId::from_raw(id.raw()), id);
    }

    #[test]
    fn removing_unknown_id_is_false() {
        let mut subs = Subscriptions::default();
        assert!(!subs.remove(SubscriptionId::new()));
    }

    #[test]
    fn clear_reports_count() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut subs = Subscriptions::default();
        subs.insert(recording(&log, "a"));
        subs.insert(recording(&log, "a"));

        assert_eq!(subs.len(), 2);
        assert_eq!(subs.clear(), 2);
        assert_eq!(subs.len(), 0);
    }
}
