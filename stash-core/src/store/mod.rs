//! Stores
//!
//! This module implements the store itself and the ways of obtaining one.
//!
//! # Concepts
//!
//! ## Store
//!
//! A [`Store`] holds one state object, addressed by a string id. State is
//! changed only through store methods (`patch`, `mutate`,
//! `replace_and_notify`, `replace_state`), and each notifying method emits
//! exactly one [`ChangeEvent`] after the change has been applied.
//!
//! ## Subscriptions
//!
//! `subscribe` registers a callback receiving every event together with the
//! resulting state. The returned [`SubscriptionId`] unsubscribes it again;
//! `dispose` drops all of them at once.
//!
//! ## Caches and registries
//!
//! A [`StoreCache`] constructs its store lazily and can be cleared to start
//! over from the initial state. A [`StoreRegistry`] is a set of caches keyed
//! by id, guaranteeing one store per id within it.

mod builder;
mod cache;
mod context;
mod event;
mod registry;
#[allow(clippy::module_inception)]
mod store;
mod subscription;

pub use builder::StoreBuilder;
pub use cache::{SlotState, StoreCache};
pub use event::{ChangeEvent, ChangeKind};
pub use registry::StoreRegistry;
pub use store::Store;
pub use subscription::{Callback, SubscriptionId};
