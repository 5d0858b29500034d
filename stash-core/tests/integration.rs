//! Integration Tests for Stores
//!
//! These tests drive stores through the public API only: construction,
//! patching, subscriptions, caches and the devtools hook.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use stash_core::devtools::{self, DevtoolsMessage, MemorySink};
use stash_core::patch::merge;
use stash_core::{create_store, make_store, ChangeEvent, ChangeKind, StoreError};

fn record_events(store: &stash_core::Store) -> Arc<Mutex<Vec<ChangeEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let events_clone = events.clone();
    store.subscribe(move |event, _state| {
        events_clone.lock().unwrap().push(event.clone());
    });
    events
}

/// Leaf paths present in the patch are overwritten, the rest survive.
#[test]
fn merge_overwrites_only_patched_leaves() {
    let Value::Object(mut target) = json!({"a": {"b": 1, "c": 2}, "d": 3}) else {
        unreachable!()
    };
    let Value::Object(patch) = json!({"a": {"b": 9}}) else {
        unreachable!()
    };

    merge(&mut target, &patch);

    assert_eq!(Value::Object(target), json!({"a": {"b": 9, "c": 2}, "d": 3}));
}

/// Arrays are replaced wholesale through the store as well.
#[test]
fn patch_replaces_arrays() {
    let store = create_store("lists", json!({"list": [1, 2, 3]})).unwrap();
    store.patch(json!({"list": [9]})).unwrap();
    assert_eq!(*store.state(), json!({"list": [9]}));
}

/// One patch call notifies each subscriber exactly once.
#[test]
fn single_notification_per_patch() {
    let store = create_store("single", json!({"x": 0})).unwrap();
    let first = record_events(&store);
    let second = record_events(&store);

    store.patch(json!({"x": 1})).unwrap();

    for events in [first, second] {
        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, ChangeKind::Patch);
        assert_eq!(events[0].payload, json!({"x": 1}));
        assert_eq!(events[0].store_name, "single");
    }
}

/// A deep patch touching many fields yields no "in place" events.
#[test]
fn patch_never_emits_in_place() {
    let store = create_store(
        "suppressed",
        json!({"a": {"b": {"c": 1}}, "d": 1, "e": [1]}),
    )
    .unwrap();
    let events = record_events(&store);

    store
        .patch(json!({"a": {"b": {"c": 2, "z": true}}, "d": 2, "e": []}))
        .unwrap();

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert!(events.iter().all(|event| event.kind != ChangeKind::InPlace));
}

/// Direct mutation emits exactly one "in place" event with an empty payload.
#[test]
fn mutate_notifies_in_place() {
    let store = create_store("direct", json!({"todo": []})).unwrap();
    let events = record_events(&store);

    store.mutate(|state| {
        state.insert("todo".into(), json!(["write tests"]));
        state.insert("done".into(), json!(false));
    });

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, ChangeKind::InPlace);
    assert_eq!(events[0].payload, json!({}));
}

/// Silent replacement and notifying replacement are separate operations.
#[test]
fn replace_variants() {
    let store = create_store("replace", json!({"a": 1})).unwrap();
    let events = record_events(&store);

    store.replace_state(json!({"b": 2})).unwrap();
    assert!(events.lock().unwrap().is_empty());
    assert_eq!(*store.state(), json!({"b": 2}));

    store.replace_and_notify(json!({"c": 3})).unwrap();
    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, ChangeKind::Replace);
    assert_eq!(*store.state(), json!({"c": 3}));
}

/// The cache hands out one instance until cleared.
#[test]
fn cache_identity_and_reset() {
    let cache = make_store("cached", json!({"count": 0})).unwrap();

    let a = cache.use_store();
    let b = cache.use_store();
    assert!(a.ptr_eq(&b));
    assert_eq!(a.id(), b.id());

    a.patch(json!({"count": 10})).unwrap();
    assert_eq!(b.get("/count"), Some(json!(10)));

    cache.clear();
    let c = cache.use_store();
    assert!(!c.ptr_eq(&a));
    assert_eq!(*c.state(), json!({"count": 0}));
}

/// Reads always see the latest value; there is no way to assign state.
#[test]
fn state_view_tracks_latest_value() {
    let store = create_store("view", json!({"n": 0})).unwrap();

    for n in 1..=3 {
        store.patch(json!({"n": n})).unwrap();
        assert_eq!(store.state()["n"], json!(n));
        assert_eq!(store.with_state(|state| state["n"].clone()), json!(n));
    }

    // Cloning a snapshot and editing it does not touch the store.
    let mut copy = (*store.state()).clone();
    copy["n"] = json!(100);
    assert_eq!(store.get("/n"), Some(json!(3)));
}

/// Subscribers see the state after the change, and can unsubscribe.
#[test]
fn subscribers_receive_current_state() {
    let store = create_store("current", json!({"user": {"name": "Ada"}})).unwrap();
    let names = Arc::new(Mutex::new(Vec::new()));
    let names_clone = names.clone();
    let id = store.subscribe(move |_, state| {
        names_clone.lock().unwrap().push(state["user"]["name"].clone());
    });

    store.patch(json!({"user": {"name": "Grace"}})).unwrap();
    store.unsubscribe(id);
    store.patch(json!({"user": {"name": "Edsger"}})).unwrap();

    assert_eq!(*names.lock().unwrap(), vec![json!("Grace")]);
}

/// Subscribers are called in registration order.
#[test]
fn subscribers_run_in_order() {
    let store = create_store("order", json!({})).unwrap();
    let order = Arc::new(Mutex::new(Vec::new()));
    for i in 0..4 {
        let order = order.clone();
        store.subscribe(move |_, _| order.lock().unwrap().push(i));
    }

    store.patch(json!({"k": 1})).unwrap();

    assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3]);
}

/// Construction fails fast on non-object state.
#[test]
fn invalid_initial_state() {
    assert!(matches!(
        create_store("bad", json!([1, 2, 3])),
        Err(StoreError::InvalidStateShape { found: "array", .. })
    ));
    assert!(make_store("bad", json!(42)).is_err());
}

/// A panicking subscriber is isolated from the others.
#[test]
fn subscriber_panic_is_isolated() {
    let store = create_store("isolated", json!({})).unwrap();
    let delivered = Arc::new(AtomicUsize::new(0));

    let before = delivered.clone();
    store.subscribe(move |_, _| {
        before.fetch_add(1, Ordering::SeqCst);
    });
    store.subscribe(|_, _| panic!("subscriber failure"));
    let after = delivered.clone();
    store.subscribe(move |_, _| {
        after.fetch_add(1, Ordering::SeqCst);
    });

    store.patch(json!({"a": 1})).unwrap();
    store.patch(json!({"a": 2})).unwrap();

    assert_eq!(delivered.load(Ordering::SeqCst), 4);
}

/// Stores created after the hook is installed report to it.
#[test]
fn installed_devtools_hook_receives_traffic() {
    let sink = Arc::new(MemorySink::new());
    devtools::install(sink.clone());

    let store = create_store("hooked-store", json!({"a": 1})).unwrap();
    store.patch(json!({"a": 2})).unwrap();

    devtools::uninstall();

    let messages = sink.messages_for("hooked-store");
    assert_eq!(messages.len(), 2);
    assert!(matches!(messages[0], DevtoolsMessage::Init { .. }));
    match &messages[1] {
        DevtoolsMessage::Mutation { event, state } => {
            assert_eq!(event.kind, ChangeKind::Patch);
            assert_eq!(state, &json!({"a": 2}));
        }
        other => panic!("unexpected message: {other:?}"),
    }
}
