//! Dispatch Context
//!
//! Tracks which stores are currently delivering events on this thread.
//!
//! Notification is synchronous, so a subscriber that patches its own store
//! re-enters dispatch before the outer event has finished. Each dispatch
//! pushes the store's key onto a thread-local stack and pops it when the
//! guard drops; counting a key on the stack gives the re-entrancy depth.
//!
//! Writes are tracked the same way. A `mutate` closure runs under the state
//! write lock, so touching the same store from inside it would block on a
//! lock this thread already holds. [`WriteContext`] marks the store while
//! the lock is held, letting the store fail loudly instead of hanging.

use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};

thread_local! {
    static DISPATCH_STACK: RefCell<Vec<StoreKey>> = const { RefCell::new(Vec::new()) };
    static WRITE_STACK: RefCell<Vec<StoreKey>> = const { RefCell::new(Vec::new()) };
}

/// Process-unique identity of a store instance.
///
/// Store ids are user-chosen and may repeat across caches, so dispatch
/// tracking keys on the instance instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct StoreKey(u64);

impl StoreKey {
    pub(crate) fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Guard that pops the dispatch entry when dropped.
///
/// Keeps the stack balanced even if a subscriber panics through dispatch.
pub(crate) struct DispatchContext {
    key: StoreKey,
}

impl DispatchContext {
    /// Enter dispatch for `key`.
    pub(crate) fn enter(key: StoreKey) -> Self {
        DISPATCH_STACK.with(|stack| stack.borrow_mut().push(key));
        Self { key }
    }

    /// How many dispatches of `key` are active on this thread.
    pub(crate) fn depth(key: StoreKey) -> usize {
        DISPATCH_STACK.with(|stack| stack.borrow().iter().filter(|k| **k == key).count())
    }
}

impl Drop for DispatchContext {
    fn drop(&mut self) {
        DISPATCH_STACK.with(|stack| {
            let popped = stack.borrow_mut().pop();
            debug_assert_eq!(
                popped,
                Some(self.key),
                "DispatchContext mismatch: expected {:?}, got {:?}",
                self.key,
                popped
            );
        });
    }
}

/// Guard marking a store's state as write-locked on this thread.
pub(crate) struct WriteContext {
    key: StoreKey,
}

impl WriteContext {
    pub(crate) fn enter(key: StoreKey) -> Self {
        WRITE_STACK.with(|stack| stack.borrow_mut().push(key));
        Self { key }
    }

    /// Whether this thread currently holds the write lock of `key`.
    pub(crate) fn is_writing(key: StoreKey) -> bool {
        WRITE_STACK.with(|stack| stack.borrow().contains(&key))
    }
}

impl Drop for WriteContext {
    fn drop(&mut self) {
        WRITE_STACK.with(|stack| {
            let popped = stack.borrow_mut().pop();
            debug_assert_eq!(
                popped,
                Some(self.key),
                "WriteContext mismatch: expected {:?}, got {:?}",
                self.key,
                popped
            );
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_follows_guards() {
        let key = StoreKey::new();
        assert_eq!(DispatchContext::depth(key), 0);

        {
            let _outer = DispatchContext::enter(key);
            assert_eq!(DispatchContext::depth(key), 1);

            {
                let _inner = DispatchContext::enter(key);
                assert_eq!(DispatchContext::depth(key), 2);
            }

            assert_eq!(DispatchContext::depth(key), 1);
        }

        assert_eq!(DispatchContext::depth(key), 0);
    }

    #[test]
    fn keys_are_counted_separately() {
        let a = StoreKey::new();
        let b = StoreKey::new();

        let _a = DispatchContext::enter(a);
        let _b = DispatchContext::enter(b);

        assert_eq!(DispatchContext::depth(a), 1);
        assert_eq!(DispatchContext::depth(b), 1);
    }

    #[test]
    fn write_marker_is_scoped() {
        let key = StoreKey::new();
        let other = StoreKey::new();
        assert!(!WriteContext::is_writing(key));

        {
            let _write = WriteContext::enter(key);
            assert!(WriteContext::is_writing(key));
            assert!(!WriteContext::is_writing(other));
        }

        assert!(!WriteContext::is_writing(key));
    }
}
